//! Configuration management for the client.

use crate::{parse_level, CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default API base address (local development backend).
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Default transport timeout for a single request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Roles allowed to see privileged navigation entries.
pub const DEFAULT_PRIVILEGED_ROLES: &[&str] = &["superadmin"];

const API_URL_ENV: &str = "LABINV_API_URL";
const LOG_LEVEL_ENV: &str = "LABINV_LOG_LEVEL";
const REQUEST_TIMEOUT_ENV: &str = "LABINV_REQUEST_TIMEOUT_SECS";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Base address of the inventory JSON API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Transport timeout per request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Roles that may see privileged navigation entries.
    #[serde(default = "default_privileged_roles")]
    pub privileged_roles: Vec<String>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_privileged_roles() -> Vec<String> {
    DEFAULT_PRIVILEGED_ROLES
        .iter()
        .map(|r| r.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            privileged_roles: default_privileged_roles(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override fields from environment variables.
    ///
    /// Empty values are ignored. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(api_url) = non_empty(API_URL_ENV) {
            self.api_url = api_url;
        }
        if let Some(log_level) = non_empty(LOG_LEVEL_ENV) {
            self.log_level = log_level;
        }
        if let Some(raw) = non_empty(REQUEST_TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid {}", REQUEST_TIMEOUT_ENV),
            }
        }
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> CoreResult<()> {
        self.api_base_url()?;
        if parse_level(&self.log_level).is_none() {
            return Err(CoreError::Config(format!(
                "Unknown log level: {}",
                self.log_level
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the API base address as a parsed URL.
    ///
    /// Only `http` and `https` are accepted.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        let url = Url::parse(&self.api_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CoreError::Config(format!(
                "Unsupported API URL scheme: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.privileged_roles, vec!["superadmin".to_string()]);
    }

    #[test]
    fn test_config_load_from_file_partial() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        std::fs::write(&config_path, r#"{ "log_level": "debug" }"#).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = Config::default();
        config.api_url = "https://inventaris.example.ac.id/api".to_string();
        config.privileged_roles = vec!["superadmin".to_string(), "admin".to_string()];
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded.api_url, "https://inventaris.example.ac.id/api");
        assert_eq!(loaded.privileged_roles.len(), 2);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env_of(&[
            ("LABINV_API_URL", "http://10.0.0.5:9000/api"),
            ("LABINV_LOG_LEVEL", "debug"),
            ("LABINV_REQUEST_TIMEOUT_SECS", "5"),
        ]));

        assert_eq!(config.api_url, "http://10.0.0.5:9000/api");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_env_ignores_empty_and_invalid_values() {
        let mut config = Config::default();
        config.apply_env(env_of(&[
            ("LABINV_API_URL", "   "),
            ("LABINV_REQUEST_TIMEOUT_SECS", "soon"),
        ]));

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_api_base_url_parse() {
        let config = Config::default();
        let url = config.api_base_url().unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_invalid_api_url() {
        let mut config = Config::default();
        config.api_url = "not a valid url".to_string();
        assert!(config.validate().is_err());

        config.api_url = "ftp://example.com/api".to_string();
        assert!(matches!(config.api_base_url(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.log_level = "INFO".to_string();
        assert!(config.validate().is_ok());
    }
}
