//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{PartitionNames, PrecacheManifest};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*; nested keys split on `__`)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin that path-relative requests are resolved against.
    ///
    /// Set via SWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite partition store.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum response body size accepted from the network.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Transport timeout in milliseconds. The proxy itself imposes none.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Partition naming, precache manifest and classification namespaces.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Build-time cache constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Version suffix shared by all current partition names.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,

    #[serde(default = "default_dynamic_prefix")]
    pub dynamic_prefix: String,

    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,

    /// Paths fetched into the static partition on install, in order.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Path segment marking static assets.
    #[serde(default = "default_static_namespace")]
    pub static_namespace: String,

    /// Path segments marking dynamic content.
    #[serde(default = "default_dynamic_namespaces")]
    pub dynamic_namespaces: Vec<String>,
}

fn default_origin() -> String {
    "http://localhost:8000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_version() -> String {
    "v1.2".into()
}

fn default_static_prefix() -> String {
    "static".into()
}

fn default_dynamic_prefix() -> String {
    "dynamic".into()
}

fn default_image_prefix() -> String {
    "images".into()
}

fn default_precache() -> Vec<String> {
    [
        "/",
        "/static/critical.css",
        "/static/styles.css",
        "/static/script.js",
        "/static/image-optimizer.js",
        "/static/assets/favicon.svg",
        "/static/assets/apple-touch-icon.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_static_namespace() -> String {
    "/static/".into()
}

fn default_dynamic_namespaces() -> Vec<String> {
    vec!["/api/".into(), "/admin/".into()]
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            static_prefix: default_static_prefix(),
            dynamic_prefix: default_dynamic_prefix(),
            image_prefix: default_image_prefix(),
            precache: default_precache(),
            static_namespace: default_static_namespace(),
            dynamic_namespaces: default_dynamic_namespaces(),
        }
    }
}

impl CacheConfig {
    /// Current-version partition names.
    pub fn partition_names(&self) -> PartitionNames {
        PartitionNames::versioned(&self.version, &self.static_prefix, &self.dynamic_prefix, &self.image_prefix)
    }

    pub fn manifest(&self) -> PrecacheManifest {
        PrecacheManifest::new(self.precache.iter().cloned())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}
