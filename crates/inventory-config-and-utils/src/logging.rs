//! Logging initialization.
//!
//! Thin wrapper over the observability crate so every entry point logs to
//! the same JSONL file under the client's base directory.

use crate::Paths;

/// Initialize logging for a labinv process.
///
/// - Structured JSONL output to `<base>/logs/client.jsonl`
/// - Log level from `RUST_LOG` or the provided default
/// - Service name included in every log line
///
/// ```ignore
/// init_logging("cli", "warn", &paths, false);
/// tracing::info!("started");
/// ```
pub fn init_logging(service_name: &str, level: &str, paths: &Paths, also_stderr: bool) {
    observability::init_with_config(observability::LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(level)
            .map(|l| l.as_str().to_lowercase())
            .unwrap_or_else(|| crate::DEFAULT_LOG_LEVEL.to_string()),
        log_path: Some(paths.log_file()),
        also_stderr,
    });
}

/// Parse a level name as accepted in config and `--log-level`.
///
/// Case-insensitive; `warning` is an alias for `warn`.
pub fn parse_level(level: &str) -> Option<tracing::Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(tracing::Level::TRACE),
        "debug" => Some(tracing::Level::DEBUG),
        "info" => Some(tracing::Level::INFO),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "error" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_known_names() {
        assert_eq!(parse_level("debug"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_level("Warning"), Some(tracing::Level::WARN));
        assert_eq!(parse_level(" ERROR "), Some(tracing::Level::ERROR));
    }

    #[test]
    fn parse_level_rejects_unknown() {
        assert_eq!(parse_level(""), None);
        assert_eq!(parse_level("verbose"), None);
    }
}
