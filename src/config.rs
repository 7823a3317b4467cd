//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\media-resolver\config.toml
//! - macOS: ~/Library/Application Support/media-resolver/config.toml
//! - Linux: ~/.config/media-resolver/config.toml
//!
//! The config file is human-readable and editable. Every section is optional;
//! anything left out falls back to the built-in provider defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ratelimit::Quota;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolution-wide settings
    pub resolver: ResolverConfig,

    /// Per-catalog settings
    pub providers: ProvidersConfig,
}

/// Resolution-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Overall budget for one resolution
    pub deadline_ms: u64,

    /// How often idle rate-limit buckets are swept
    pub sweep_interval_secs: u64,

    /// Buckets untouched for this long are evicted
    pub idle_horizon_secs: u64,

    /// Quota for rate keys without an explicit provider quota
    pub default_rate_limit: Quota,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 8_000,
            sweep_interval_secs: 60,
            idle_horizon_secs: 600,
            default_rate_limit: Quota::default(),
        }
    }
}

impl ResolverConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn idle_horizon(&self) -> Duration {
        Duration::from_secs(self.idle_horizon_secs)
    }
}

/// One section per supported catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub musicbrainz: ProviderConfig,
    pub discogs: ProviderConfig,
    pub omdb: ProviderConfig,
    pub itunes: ProviderConfig,
    pub upcitemdb: ProviderConfig,
}

/// Settings for a single catalog.
///
/// Unset values fall back to that catalog's [`ProviderDefaults`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    /// API key / personal token (keep out of version control)
    pub api_key: Option<String>,
    /// Lower ranks are tried first
    pub rank: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub rate_limit: Option<Quota>,
    /// Share a bucket with other providers by giving them the same key
    pub rate_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            api_key: None,
            rank: None,
            timeout_ms: None,
            rate_limit: None,
            rate_key: None,
        }
    }
}

/// Built-in settings for one catalog
#[derive(Debug, Clone, Copy)]
pub struct ProviderDefaults {
    pub base_url: &'static str,
    pub rank: u32,
    pub timeout_ms: u64,
    pub rate_limit: Quota,
}

/// Fully-resolved settings the registry builds a provider from
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub rank: u32,
    pub timeout: Duration,
    pub rate_limit: Quota,
    pub rate_key: String,
}

impl ProviderConfig {
    /// Fill unset values from `defaults`. Blank strings count as unset.
    pub fn resolve(&self, id: &str, defaults: &ProviderDefaults) -> ProviderSettings {
        ProviderSettings {
            base_url: non_blank(&self.base_url).unwrap_or(defaults.base_url).to_string(),
            api_key: non_blank(&self.api_key).map(str::to_string),
            rank: self.rank.unwrap_or(defaults.rank),
            timeout: Duration::from_millis(self.timeout_ms.unwrap_or(defaults.timeout_ms)),
            rate_limit: self.rate_limit.unwrap_or(defaults.rate_limit),
            rate_key: non_blank(&self.rate_key).unwrap_or(id).to_string(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("media-resolver"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit path, with the same fallbacks as [`load`]
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

/// Write a default config to `path`, or to the default location when `None`.
///
/// Never replaces an existing file. Returns the path written.
pub fn write_default(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => config_path().ok_or(ConfigError::NoConfigDir)?,
    };
    if target.exists() {
        return Err(ConfigError::AlreadyExists(target));
    }

    let config = Config::default();
    match path {
        Some(path) => save_to(&config, path)?,
        None => save(&config)?,
    }
    Ok(target)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),

    #[error("Config file already exists at {0}")]
    AlreadyExists(PathBuf),
}

// ============================================================================
// Tests
// ============================================================================
