//! Configuration file loading
//!
//! The TOML file is optional. Values it provides sit below command-line
//! arguments and environment variables and above compiled defaults.
//!
//! Config file resolution order:
//! 1. Explicit path (command-line argument)
//! 2. Environment variable naming a path
//! 3. User config directory (`~/.config/airify/config.toml` on Linux)
//! 4. System config (`/etc/airify/config.toml`, unix only)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "AIRIFY_CONFIG";

/// `[server]` section
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// `[device]` section: the audio output device
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub volume: Option<u8>,
}

/// `[account]` section: content session credentials
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccountSection {
    pub user: Option<String>,
    pub password: Option<String>,
}

/// `[playback]` section
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackSection {
    pub playlist: Option<String>,
    pub playlist_dir: Option<PathBuf>,
    pub shuffle: Option<bool>,
    pub speed: Option<f64>,
}

/// Parsed contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub log_level: Option<String>,
    pub server: ServerSection,
    pub device: DeviceSection,
    pub account: AccountSection,
    pub playback: PlaybackSection,
}

impl TomlConfig {
    /// Parse a config file; a malformed file is an error
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomlConfig = toml::from_str(&content)?;
        debug!("Parsed config file {}", path.display());
        Ok(config)
    }

    /// Resolve and load the config file, falling back to defaults when none exists
    ///
    /// A missing file only produces a warning. A file that exists but cannot be
    /// parsed is still an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match resolve_config_path(explicit) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                warn!("No config file found, using command-line arguments and defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Find the config file to load, if any
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!("Config file {} does not exist", path.display());
        return None;
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        warn!("{} points at missing file {}", CONFIG_ENV_VAR, path.display());
    }

    // Priority 3/4: platform locations
    default_config_locations().into_iter().find(|p| p.exists())
}

/// Candidate config file locations for the platform, most specific first
pub fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("airify").join("config.toml"));
    }

    if cfg!(unix) {
        locations.push(PathBuf::from("/etc/airify/config.toml"));
    }

    locations
}

/// Validate a 0-100 volume value
pub fn validate_volume(volume: u8) -> Result<u8> {
    if volume > 100 {
        return Err(Error::InvalidInput(format!(
            "volume must be between 0 and 100, got {}",
            volume
        )));
    }
    Ok(volume)
}
