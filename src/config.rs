//src/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "dropset-core";
const CONFIG_ENV_VAR: &str = "DROPSET_CONFIG_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid streak look-back window: {0} days")]
    InvalidStreakWindow(u32),
    #[error("Volume thresholds must satisfy 0 < low < high, got low={low}, high={high}")]
    InvalidVolumeThresholds { low: f64, high: f64 },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric, // kg, 2.5 plate increments
    Imperial, // lbs, 5 plate increments
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    pub units: Units,
    /// Look-back window for streak computation, in days.
    pub streak_window_days: u32,
    /// Trailing window covered by the consistency grid, in days.
    pub consistency_window_days: u32,
    /// Daily volume below this counts as a low-intensity day.
    pub low_volume_threshold: f64,
    /// Daily volume at or above this counts as a high-intensity day.
    pub high_volume_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: Units::default(),
            streak_window_days: 30,
            consistency_window_days: 35,
            low_volume_threshold: 5000.0,
            high_volume_threshold: 10_000.0,
        }
    }
}

impl Config {
    /// Checks the analytics windows and thresholds for sanity.
    /// # Errors
    /// Returns `Error::InvalidStreakWindow` or `Error::InvalidVolumeThresholds`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.streak_window_days == 0 {
            return Err(Error::InvalidStreakWindow(self.streak_window_days));
        }
        if self.low_volume_threshold <= 0.0
            || self.high_volume_threshold <= self.low_volume_threshold
        {
            return Err(Error::InvalidVolumeThresholds {
                low: self.low_volume_threshold,
                high: self.high_volume_threshold,
            });
        }
        Ok(())
    }
}

/// Determines the path to the configuration file.
/// # Errors
/// Returns `Error::CannotDetermineConfigDir` or I/O errors creating it.
pub fn get_config_path() -> Result<PathBuf, Error> {
    let config_dir_override = std::env::var(CONFIG_ENV_VAR).ok();

    let config_dir_path = if let Some(path_str) = config_dir_override {
        let path = PathBuf::from(path_str);
        if !path.is_dir() {
            fs::create_dir_all(&path)?;
        }
        path
    } else {
        let base_config_dir = dirs::config_dir().ok_or(Error::CannotDetermineConfigDir)?;
        base_config_dir.join(APP_CONFIG_DIR)
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from the TOML file at the given path, writing a
/// default config there on first run.
/// # Errors
/// Returns `Error` variants on I/O, parse, or validation failure.
pub fn load(config_path: &Path) -> Result<Config, Error> {
    if config_path.exists() {
        let config_content = fs::read_to_string(config_path)?;
        // #[serde(default)] fills fields missing from older files
        let config: Config = toml::from_str(&config_content).map_err(Error::TomlParse)?;
        config.validate()?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    }
}

/// Saves the configuration to the TOML file.
/// # Errors
/// Returns `Error` variants on serialization or I/O failure.
pub fn save(config_path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config).map_err(Error::TomlSerialize)?;
    fs::write(config_path, config_content)?;
    Ok(())
}
