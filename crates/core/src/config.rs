//! Configuration for the catalog layer
//!
//! Every field is optional; accessors return the documented default when a
//! field is unset. Files are TOML with camelCase keys.

use crate::model::ClientPlatform;
use crate::{Error, Result};
use appstore_cache::{CachePolicies, CachePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = appstore_cache::CACHE_DIR_ENV;
/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "APPSTORE_DATA_DIR";

const DEFAULT_APP_CACHE_TTL_SECS: u64 = 4 * 60 * 60;
const DEFAULT_HOME_CACHE_TTL_SECS: u64 = 4 * 60 * 60;
const DEFAULT_CATEGORY_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_LOCKER_LOAD_LIMIT: usize = 100;
const DEFAULT_FETCH_CONCURRENCY: usize = 10;

/// Catalog layer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Cache root. Default: resolved by [`Config::resolve_cache_root`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding persisted sources. Default: OS data dir + `appstore`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Phone OS reported to catalogs. Default: `android`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_platform: Option<ClientPlatform>,

    /// Default: 4 hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_cache_ttl_secs: Option<u64>,

    /// Default: 4 hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_cache_ttl_secs: Option<u64>,

    /// Default: 24 hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_cache_ttl_secs: Option<u64>,

    /// Whole-request timeout. Default: 15 seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Default: 5 seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    /// Maximum local locker entries read per resolution. Default: 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locker_load_limit: Option<usize>,

    /// Consult the remote account locker. Default: `true`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_native_app_store: Option<bool>,

    /// Concurrent one-by-one app fetches. Default: 10
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_concurrency: Option<usize>,
}

impl Config {
    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::configuration(e.to_string()))
    }

    /// Load a TOML file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        Ok(Self::from_toml_str(&text)?.with_env_overrides())
    }

    /// Load `path` if given, else the default config file if it exists, else
    /// defaults. Environment overrides are applied in every case.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(default) if default.is_file() => Self::load(&default),
            _ => Ok(Self::default().with_env_overrides()),
        }
    }

    /// `<config dir>/appstore/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("appstore").join("config.toml"))
    }

    /// Apply `APPSTORE_CACHE_DIR` and `APPSTORE_DATA_DIR`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = env_path(CACHE_DIR_ENV) {
            self.cache_dir = Some(dir);
        }
        if let Some(dir) = env_path(DATA_DIR_ENV) {
            self.data_dir = Some(dir);
        }
        self
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Phone OS reported to catalogs
    #[must_use]
    pub fn client_platform(&self) -> ClientPlatform {
        self.client_platform.unwrap_or_default()
    }

    /// Per-namespace cache TTLs
    #[must_use]
    pub fn cache_policies(&self) -> CachePolicies {
        let secs = |value: Option<u64>, default| {
            CachePolicy::new(Duration::from_secs(value.unwrap_or(default)))
        };
        CachePolicies {
            app: secs(self.app_cache_ttl_secs, DEFAULT_APP_CACHE_TTL_SECS),
            category: secs(self.category_cache_ttl_secs, DEFAULT_CATEGORY_CACHE_TTL_SECS),
            home: secs(self.home_cache_ttl_secs, DEFAULT_HOME_CACHE_TTL_SECS),
        }
    }

    /// Whole-request timeout
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Connect timeout
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Local locker read limit
    #[must_use]
    pub fn locker_load_limit(&self) -> usize {
        self.locker_load_limit.unwrap_or(DEFAULT_LOCKER_LOAD_LIMIT)
    }

    /// Whether the remote account locker is consulted
    #[must_use]
    pub fn use_native_app_store(&self) -> bool {
        self.use_native_app_store.unwrap_or(true)
    }

    /// Concurrent one-by-one fetches, at least 1
    #[must_use]
    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
            .unwrap_or(DEFAULT_FETCH_CONCURRENCY)
            .max(1)
    }

    /// Resolve the cache root: `cacheDir`, then the usual fallbacks.
    pub fn resolve_cache_root(&self) -> Result<PathBuf> {
        Ok(appstore_cache::resolve_cache_root(
            self.cache_dir.as_deref(),
        )?)
    }

    /// Directory holding persisted sources
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("appstore")
        })
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}
