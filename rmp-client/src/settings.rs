//! Client settings
//!
//! Settings live in a JSON file under the XDG config directory. Every field
//! is optional in the file; command line flags are applied on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rmp_sync::{SyncConfig, SyncError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`Settings`]
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A zero tick would spin the loop
    #[error("tick_ms must be at least 1")]
    ZeroTick,

    /// Sync engine configuration rejected
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Serial port of the panel (e.g. /dev/ttyACM0, COM3)
    pub serial_port: Option<String>,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Loop cadence in milliseconds
    pub tick_ms: u64,
    /// Serial read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Sync engine configuration
    pub sync: SyncConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serial_port: None,
            baud_rate: 9600,
            tick_ms: 10,
            read_timeout_ms: 1000,
            sync: SyncConfig::default(),
        }
    }
}

impl Settings {
    /// Get the XDG config directory for rmp-client
    /// Uses $XDG_CONFIG_HOME/rmp-client, falls back to ~/.config/rmp-client
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("rmp-client"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("rmp-client"))
    }

    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from an explicit file, or the default file if present
    ///
    /// An explicit file must exist. A missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load settings from `path`
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse settings from JSON text
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.tick_ms == 0 {
            return Err(SettingsError::ZeroTick);
        }
        self.sync.validate()?;
        Ok(())
    }

    /// Loop cadence
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Serial read timeout
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
