//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
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
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - the cache version is empty or two partition names collide
    /// - a precache path does not start with `/`
    ///
    /// Returns `ConfigError::Missing` if the static namespace is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        match url::Url::parse(&self.origin) {
            Ok(origin) if matches!(origin.scheme(), "http" | "https") => {}
            Ok(origin) => return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme()))),
            Err(e) => return Err(invalid("origin", e.to_string())),
        }

        let cache = &self.cache;
        if cache.version.trim().is_empty() {
            return Err(invalid("cache.version", "must not be empty"));
        }

        let names = cache.partition_names();
        let distinct: HashSet<&str> = names.current().into_iter().collect();
        if distinct.len() != 3 {
            return Err(invalid("cache", "static, dynamic and image partition names must differ"));
        }

        if cache.static_namespace.is_empty() {
            return Err(ConfigError::Missing {
                field: "cache.static_namespace".into(),
                hint: "Set SWCACHE_CACHE__STATIC_NAMESPACE, e.g. /static/".into(),
            });
        }

        if let Some(bad) = cache.precache.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("cache.precache", format!("path must start with '/': {bad}")));
        }

        let unique: HashSet<&String> = cache.precache.iter().collect();
        if unique.len() != cache.precache.len() {
            tracing::warn!(
                entries = cache.precache.len(),
                unique = unique.len(),
                "precache manifest contains duplicate paths"
            );
        }

        Ok(())
    }
}
