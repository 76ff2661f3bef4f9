//! Configuration settings for the timegrid calendar core.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub layout: LayoutConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("timegrid.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("timegrid/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".timegrid/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch.timeout_secs must be > 0".to_string()).into());
        }
        if self.layout.pixels_per_minute <= 0.0 {
            return Err(
                ConfigError::Invalid("layout.pixels_per_minute must be > 0".to_string()).into(),
            );
        }
        if self.layout.day_minutes == 0 {
            return Err(ConfigError::Invalid("layout.day_minutes must be > 0".to_string()).into());
        }
        Ok(())
    }
}

/// Remote fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base URL of the event API (the `/events` endpoint is appended).
    pub base_url: String,
    /// Bearer token (loaded from TIMEGRID_API_TOKEN if not set).
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Quiescence window after the last navigation change before a fetch
    /// cycle starts, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: None,
            timeout_secs: 30,
            debounce_ms: 150,
        }
    }
}

/// Layout geometry configuration, shared with the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical scale: pixels per minute of event time.
    pub pixels_per_minute: f32,
    /// Minutes in a rendered day column.
    pub day_minutes: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pixels_per_minute: 1.0,
            day_minutes: 24 * 60,
        }
    }
}
