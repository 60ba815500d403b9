use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::application::PageResetPolicy;
use crate::constants::{
    BASE_URL_ENV_VAR, CACHE_GC_TIME_SECS, DEFAULT_BASE_URL, DEFAULT_PER_PAGE, SEARCH_DEBOUNCE_MS, TOKEN_ENV_VAR,
};

/// TOML configuration. Every section and field is optional.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CacheConfig {
    /// Seconds after which a cached page is refetched. Unset: only
    /// mutations make pages stale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_time_secs: Option<u64>,
    /// Seconds an unused page stays cached; 0 keeps pages forever.
    #[serde(default = "default_gc_time_secs")]
    pub gc_time_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_reset_page")]
    pub reset_page_on_search: bool,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_per_page() -> u32 { DEFAULT_PER_PAGE }
fn default_debounce_ms() -> u64 { SEARCH_DEBOUNCE_MS }
fn default_reset_page() -> bool { true }
fn default_gc_time_secs() -> u64 { CACHE_GC_TIME_SECS }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            per_page: default_per_page(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: None,
            gc_time_secs: default_gc_time_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            reset_page_on_search: default_reset_page(),
        }
    }
}

impl CacheConfig {
    pub fn stale_time(&self) -> Option<Duration> {
        self.stale_time_secs.map(Duration::from_secs)
    }

    pub fn gc_time(&self) -> Option<Duration> {
        (self.gc_time_secs > 0).then(|| Duration::from_secs(self.gc_time_secs))
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn page_policy(&self) -> PageResetPolicy {
        if self.reset_page_on_search {
            PageResetPolicy::ResetToFirst
        } else {
            PageResetPolicy::Keep
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// `<config_dir>/notehub/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("notehub").join("config.toml"))
    }

    /// Load the explicit file if given (it must exist), else the default
    /// file if present, else built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(?path, "Loading config from explicit path");
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                debug!(?path, "Loading config from default path");
                Self::load(path)
            }
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn apply_env(self) -> Self {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Override token and base URL from variables returned by `lookup`.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(TOKEN_ENV_VAR) {
            self.api.token = Some(token);
        }
        if let Some(base_url) = lookup(BASE_URL_ENV_VAR) {
            self.api.base_url = base_url;
        }
        self
    }

    pub fn with_overrides(mut self, base_url: Option<String>, token: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.api.base_url = base_url;
        }
        if token.is_some() {
            self.api.token = token;
        }
        self
    }
}
