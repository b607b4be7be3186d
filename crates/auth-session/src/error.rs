//! Session error types.

use api_client::RequestFailure;
use thiserror::Error;

/// Session manager error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// A request failed. Displays the server message unchanged so login
    /// validation errors can be shown as-is.
    #[error(transparent)]
    Request(#[from] RequestFailure),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] session_store::StorageError),

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// Bootstrap was interrupted by the shutdown signal
    #[error("Session bootstrap cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] inventory_config_and_utils::CoreError),
}

impl AuthError {
    /// The underlying request failure, if this error came from the API.
    pub fn request_failure(&self) -> Option<&RequestFailure> {
        match self {
            AuthError::Request(failure) => Some(failure),
            _ => None,
        }
    }

    /// True when the server rejected the credential (401).
    pub fn is_auth_failure(&self) -> bool {
        self.request_failure()
            .is_some_and(RequestFailure::is_auth_failure)
    }

    /// True for 4xx responses other than 401.
    pub fn is_validation(&self) -> bool {
        self.request_failure()
            .is_some_and(RequestFailure::is_validation)
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
