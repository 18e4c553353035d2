//! Configuration of one gateway radio
//!
//! Normally supplied by the host; it can also be read from a JSON file:
//!
//! ```json
//! {
//!   "host": "192.168.1.20",
//!   "token": "00112233445566778899aabbccddeeff",
//!   "name": "Kitchen Radio",
//!   "volume_step": 5
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NAME: &str = "Xiaomi Gateway Radio";
pub const DEFAULT_VOLUME_STEP: u8 = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Gateway address, optionally with `:port`
    pub host: String,
    /// 32-character hexadecimal device token
    pub token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_volume_step() -> u8 {
    DEFAULT_VOLUME_STEP
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl RadioConfig {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            name: None,
            volume_step: DEFAULT_VOLUME_STEP,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_volume_step(mut self, volume_step: u8) -> Self {
        self.volume_step = volume_step;
        self
    }

    /// Poll interval in whole seconds
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Display name, falling back to the default
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_NAME)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Check the values before any connection attempt
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "host",
                reason: "must not be empty".to_string(),
            });
        }

        let token = self.token.trim();
        if token.len() != 32 || !token.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid {
                field: "token",
                reason: "must be 32 hexadecimal characters".to_string(),
            });
        }

        if !(1..=100).contains(&self.volume_step) {
            return Err(ConfigError::Invalid {
                field: "volume_step",
                reason: format!("{} is not within 1..=100", self.volume_step),
            });
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: RadioConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/gateway-radio/config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("gateway-radio").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }
}
