//! Session status as seen by routing and the UI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse lifecycle state of the client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Process start, before the persisted credential has been looked at
    /// or while it is being confirmed without a cached profile.
    Bootstrapping,
    Authenticated,
    Anonymous,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Bootstrapping => "bootstrapping",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Anonymous => "anonymous",
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated)
    }

    /// False only while bootstrapping.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionStatus::Bootstrapping)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Bootstrapping).unwrap(),
            "\"bootstrapping\""
        );
        let parsed: SessionStatus = serde_json::from_str("\"anonymous\"").unwrap();
        assert_eq!(parsed, SessionStatus::Anonymous);
    }

    #[test]
    fn test_predicates() {
        assert!(SessionStatus::Authenticated.is_authenticated());
        assert!(!SessionStatus::Anonymous.is_authenticated());
        assert!(!SessionStatus::Bootstrapping.is_settled());
        assert!(SessionStatus::Anonymous.is_settled());
        assert_eq!(SessionStatus::Authenticated.to_string(), "authenticated");
    }
}
