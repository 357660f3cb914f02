//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tubestats/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tubestats/` (~/.config/tubestats/)
//! - Data: `$XDG_DATA_HOME/tubestats/` (~/.local/share/tubestats/)
//! - State/Logs: `$XDG_STATE_HOME/tubestats/` (~/.local/state/tubestats/)

use crate::error::{Error, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Annual review settings
    #[serde(default)]
    pub review: ReviewConfig,

    /// Classified videos API (optional)
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Annual review configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReviewConfig {
    /// Hours east of UTC used to cut days and months (8 = Asia/Taipei)
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Category assigned to videos the classifier left untouched
    #[serde(default = "default_uncategorized_label")]
    pub uncategorized_label: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            uncategorized_label: default_uncategorized_label(),
        }
    }
}

impl ReviewConfig {
    /// The configured offset as a chrono offset.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        offset_from_hours(self.utc_offset_hours)
    }
}

/// Convert whole hours east of UTC into a [`FixedOffset`].
pub fn offset_from_hours(hours: i32) -> Result<FixedOffset> {
    if !(-12..=14).contains(&hours) {
        return Err(Error::Config(format!(
            "utc offset must be between -12 and 14 hours, got {}",
            hours
        )));
    }
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| Error::Config(format!("invalid utc offset: {}", hours)))
}

fn default_utc_offset_hours() -> i32 {
    8
}

fn default_uncategorized_label() -> String {
    "未分類".to_string()
}

/// Classified videos API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// API base URL (e.g., `https://stats.example.com`)
    pub base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_api_timeout(),
        }
    }
}

impl ApiConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        match self.base_url.as_deref() {
            None => Err(Error::Config("api.base_url is required".to_string())),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => Err(
                Error::Config(format!("api.base_url must be an http(s) URL: {}", url)),
            ),
            Some(_) if self.timeout_secs == 0 => Err(Error::Config(
                "api.timeout_secs must be greater than 0".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

fn default_api_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tubestats/config.toml` (~/.config/tubestats/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tubestats").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("tubestats")
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tubestats")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/tubestats/data.db` (~/.local/share/tubestats/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/tubestats/tubestats.log` (~/.local/state/tubestats/tubestats.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("tubestats.log")
    }
}
