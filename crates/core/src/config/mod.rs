//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from multiple sources:
//!
//! 1. Environment variables (SHELLCACHE_*)
//! 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Worker and host configuration.
///
/// The version is the only value that changes between deployments; it is
/// propagated into the shell cache name by the worker's shell namespace,
/// which joins `shell_namespace` and `version` as `<namespace>-<version>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the app shell. Bumping it creates a new shell generation.
    ///
    /// Set via SHELLCACHE_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Origin the worker runs under. Same-origin requests are app-shell requests
    /// and relative shell asset paths resolve against it.
    ///
    /// Set via SHELLCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Assets seeded into the shell generation at install time.
    #[serde(default = "default_shell_assets")]
    pub shell_assets: Vec<String>,

    /// Prefix of the versioned shell generation (`<namespace>-<version>`).
    #[serde(default = "default_shell_namespace")]
    pub shell_namespace: String,

    /// Name of the on-demand media cache.
    #[serde(default = "default_media_cache")]
    pub media_cache: String,

    /// Regex matched against request URLs to select network-first handling.
    #[serde(default = "default_trending_pattern")]
    pub trending_pattern: String,

    /// Regex matched against request URLs to select the media cache.
    #[serde(default = "default_media_pattern")]
    pub media_pattern: String,

    /// Path to SQLite cache database.
    ///
    /// Set via SHELLCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional network timeout in milliseconds. Unset means requests may wait
    /// indefinitely.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_version() -> String {
    "1.0".into()
}

fn default_origin() -> String {
    "http://localhost:8080/".into()
}

fn default_shell_assets() -> Vec<String> {
    [
        "index.html",
        "main.js",
        "images/flame.png",
        "images/logo.png",
        "images/sync.png",
        "vendor/bootstrap.min.css",
        "vendor/jquery.min.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_shell_namespace() -> String {
    "static".into()
}

fn default_media_cache() -> String {
    "giphy".into()
}

fn default_trending_pattern() -> String {
    r"api\.giphy\.com/v1/gifs/trending".into()
}

fn default_media_pattern() -> String {
    r"giphy\.com/media".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellcache.sqlite")
}

fn default_user_agent() -> String {
    "shellcache/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            origin: default_origin(),
            shell_assets: default_shell_assets(),
            shell_namespace: default_shell_namespace(),
            media_cache: default_media_cache(),
            trending_pattern: default_trending_pattern(),
            media_pattern: default_media_pattern(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: None,
        }
    }
}

impl AppConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHELLCACHE_`
    /// 2. TOML file from `SHELLCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("SHELLCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into()),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
