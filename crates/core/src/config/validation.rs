//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from environment,
//! files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `version`, `shell_namespace`, `media_cache` or `user_agent` is empty
    /// - `media_cache` would be collected as a stale shell generation
    /// - `origin` is not an absolute http(s) URL
    /// - either routing pattern is not a valid regex
    /// - `timeout_ms` is set below 100ms or above 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(invalid("version", "must not be empty"));
        }
        if self.shell_namespace.is_empty() {
            return Err(invalid("shell_namespace", "must not be empty"));
        }
        if self.media_cache.is_empty() {
            return Err(invalid("media_cache", "must not be empty"));
        }
        if self.media_cache.starts_with(&format!("{}-", self.shell_namespace)) {
            return Err(invalid(
                "media_cache",
                format!("must not start with the shell prefix \"{}-\"", self.shell_namespace),
            ));
        }

        match url::Url::parse(&self.origin) {
            Ok(origin) if matches!(origin.scheme(), "http" | "https") => {}
            Ok(origin) => return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme()))),
            Err(e) => return Err(invalid("origin", e.to_string())),
        }

        for (field, pattern) in [("trending_pattern", &self.trending_pattern), ("media_pattern", &self.media_pattern)] {
            regex::Regex::new(pattern).map_err(|e| invalid(field, e.to_string()))?;
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(invalid("timeout_ms", "must be at least 100ms"));
            }
            if timeout_ms > 300_000 {
                return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.shell_assets.is_empty() {
            tracing::warn!(
                namespace = %self.shell_namespace,
                version = %self.version,
                "shell_assets is empty; install will create an empty shell generation"
            );
        }

        Ok(())
    }
}
