use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_POLL_INTERVAL_MS: u64 = 2;
const DEFAULT_TIMEOUT_MS: u64 = 50;
const DEFAULT_CONFIGURATION: u8 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Top-level configuration, usually loaded from `ct363.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    pub source: SourceConfig,
}

/// Where raw packets come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Usb(UsbConfig),
    Replay(ReplayConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    #[serde(default = "default_configuration")]
    pub configuration: u8,
    #[serde(default)]
    pub interface: u8,
    /// Interrupt IN endpoint carrying finger data.
    pub endpoint: u8,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub path: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Config that only replays a capture file.
    pub fn replay(path: impl Into<PathBuf>) -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            source: SourceConfig::Replay(ReplayConfig { path: path.into() }),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_configuration() -> u8 {
    DEFAULT_CONFIGURATION
}
