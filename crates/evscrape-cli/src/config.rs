//! Configuration file management.
//!
//! Settings are taken from, in order: command-line flag, environment
//! variable, this file, built-in default. Clap already merges the first
//! two into one `Option`; the helpers here add the last two.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Automation server host
    #[serde(default)]
    pub host: Option<String>,

    /// Automation server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Always attach to an already running server
    #[serde(default)]
    pub external_server: bool,

    /// Emulator to boot
    #[serde(default)]
    pub avd: Option<String>,

    /// Device serial
    #[serde(default)]
    pub udid: Option<String>,

    /// Application package
    #[serde(default)]
    pub app_package: Option<String>,

    /// Output time zone for the refresh time
    #[serde(default)]
    pub timezone: Option<String>,

    /// Time zone the device displays
    #[serde(default)]
    pub device_timezone: Option<String>,

    /// Element lookup wait in seconds
    #[serde(default)]
    pub implicit_wait: Option<u64>,

    /// Refresh deadline in seconds
    #[serde(default)]
    pub refresh_timeout: Option<u64>,

    /// Failure screenshot path
    #[serde(default)]
    pub screenshot: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("evscrape")
            .join("config.toml")
    }

    /// Load the default config file, or return defaults if it is missing or
    /// unreadable.
    pub fn load() -> Self {
        let path = Self::path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load an explicitly named config file. Errors are not swallowed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

/// Resolve a setting: flag or env var, then config file, then default.
pub fn resolve<T>(arg: Option<T>, file: Option<T>, default: T) -> T {
    arg.or(file).unwrap_or(default)
}

/// Like [`resolve`], for settings without a default.
pub fn resolve_optional<T>(arg: Option<T>, file: Option<T>) -> Option<T> {
    arg.or(file)
}
