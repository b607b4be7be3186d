//! Request failure type.

use thiserror::Error;

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401 from any endpoint. Always tears the session down.
    Auth,
    /// Other 4xx, usually carrying a message meant for the user.
    Validation,
    /// 5xx or any other non-2xx status.
    Http,
    /// Connection, timeout or other network failure.
    Transport,
    /// A 2xx response whose body is not the expected JSON.
    Decode,
    /// The persisted credential could not be read.
    Storage,
}

/// Failure of a single API request.
///
/// `message` is the server-provided message when the response carried one,
/// so it can be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
}

impl RequestFailure {
    pub fn new(kind: FailureKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    /// Classify a non-2xx status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 => FailureKind::Auth,
            400..=499 => FailureKind::Validation,
            _ => FailureKind::Http,
        };
        Self::new(kind, Some(status), message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, None, message)
    }

    pub fn decode(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Decode, status, message)
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind == FailureKind::Auth
    }

    pub fn is_validation(&self) -> bool {
        self.kind == FailureKind::Validation
    }

    /// True for failures where the server never gave a verdict.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Transport | FailureKind::Decode)
    }
}

impl From<reqwest::Error> for RequestFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return RequestFailure::decode(e.status().map(|s| s.as_u16()), e.to_string());
        }
        match e.status() {
            Some(status) => RequestFailure::from_status(status.as_u16(), e.to_string()),
            None => RequestFailure::transport(e.to_string()),
        }
    }
}

impl From<session_store::StorageError> for RequestFailure {
    fn from(e: session_store::StorageError) -> Self {
        RequestFailure::new(FailureKind::Storage, None, e.to_string())
    }
}

/// Result type alias using RequestFailure.
pub type ApiResult<T> = Result<T, RequestFailure>;
