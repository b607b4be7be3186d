//! Errors raised while loading client configuration and paths.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A config value is present but unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `api_url` is not a URL at all.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// `config.json` exists but is not valid JSON for [`crate::Config`].
    #[error("Malformed config file: {0}")]
    Json(#[from] serde_json::Error),

    /// No home directory and no `LABINV_HOME`.
    #[error("Path error: {0}")]
    Path(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
