//! Persisted credential record for the labinv client.
//!
//! This crate provides:
//! - [`KeyValueStorage`]: the client-local key-value backend seam
//! - [`FileStorage`]: a JSON file backend with atomic writes
//! - [`MemoryStorage`]: an in-process backend for tests and ephemeral use
//! - [`SessionStore`]: load/save/clear of the `token` + `user` pair

mod file;
mod keys;
mod memory;
mod session_store;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use session_store::{SessionStore, StoredSession};
pub use traits::KeyValueStorage;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Encoding(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
