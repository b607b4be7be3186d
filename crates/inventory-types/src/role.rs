//! Flat role classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles whose holders see the admin area.
pub const ADMIN_LIKE_ROLES: &[Role] = &[Role::Superadmin, Role::Admin, Role::AdminLab];

/// Role of a user, parsed from the backend's role string.
///
/// Unknown strings are preserved in [`Role::Other`] and treated like a
/// plain user for access decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Superadmin,
    Admin,
    AdminLab,
    Logistik,
    #[default]
    User,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::AdminLab => "admin_lab",
            Role::Logistik => "logistik",
            Role::User => "user",
            Role::Other(raw) => raw,
        }
    }

    /// Membership in the fixed admin-like set.
    pub fn is_admin_like(&self) -> bool {
        ADMIN_LIKE_ROLES.contains(self)
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "superadmin" => Role::Superadmin,
            "admin" => Role::Admin,
            "admin_lab" => Role::AdminLab,
            "logistik" => Role::Logistik,
            "user" | "" => Role::User,
            _ => Role::Other(normalized),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_like_set() {
        assert!(Role::Superadmin.is_admin_like());
        assert!(Role::Admin.is_admin_like());
        assert!(Role::AdminLab.is_admin_like());
        assert!(!Role::Logistik.is_admin_like());
        assert!(!Role::User.is_admin_like());
        assert!(!Role::Other("kaprodi".to_string()).is_admin_like());
    }

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(Role::from(" Admin_Lab "), Role::AdminLab);
        assert_eq!(Role::from("SUPERADMIN"), Role::Superadmin);
        assert_eq!(Role::from(""), Role::User);
        assert_eq!(Role::from("Kaprodi"), Role::Other("kaprodi".to_string()));
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        let json = serde_json::to_string(&Role::AdminLab).unwrap();
        assert_eq!(json, "\"admin_lab\"");

        let role: Role = serde_json::from_str("\"logistik\"").unwrap();
        assert_eq!(role, Role::Logistik);
    }
}
