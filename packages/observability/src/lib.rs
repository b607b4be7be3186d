//! # Observability
//!
//! Centralized logging layer for the labinv client workspace.
//!
//! Crates are **log producers** only. They use the standard `tracing` macros
//! and never decide where output goes. The composition root (the `labinv`
//! binary) calls [`init_with_config`] once at startup, which installs:
//!
//! - a JSONL file layer (`~/.labinv/logs/client.jsonl` by default)
//! - an optional compact stderr layer
//!
//! Both layers honour `RUST_LOG`, falling back to the configured level.
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "cli".into(),
//!     default_level: "warn".into(),
//!     ..Default::default()
//! });
//! tracing::info!("ready");
//! ```

mod json_layer;
mod sink;

use std::path::PathBuf;

pub use json_layer::LogEntry;
pub use sink::{default_log_path, CentralLogWriter};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "cli", "tests").
    /// Included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.labinv/logs/client.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize the logging layer with custom configuration.
///
/// Installing a global subscriber twice is a no-op: the second call keeps
/// the first subscriber and returns quietly.
pub fn init_with_config(config: LogConfig) {
    sink::init_subscriber(&config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }
}
