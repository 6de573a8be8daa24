// src/config.rs
//! Configuration management with platform-specific storage

use crate::error::{GpsError, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

/// What a transport failure mid-cycle does to the committed fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PartialFailurePolicy {
    /// Replace the committed fix with an empty one carrying the error
    #[default]
    Discard,
    /// Keep the previous values and only replace the status
    RetainPrevious,
}

impl fmt::Display for PartialFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialFailurePolicy::Discard => write!(f, "discard"),
            PartialFailurePolicy::RetainPrevious => write!(f, "retain_previous"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsConfig {
    pub serial_port: String,
    pub serial_baudrate: u32,
    pub read_timeout_ms: u64,
    pub gather_interval_secs: u64,
    pub gather_on_startup: bool,
    /// The clock is only set when HDOP is strictly below this
    pub max_hdop: f64,
    pub on_partial_failure: PartialFailurePolicy,
    pub log_file: Option<PathBuf>,
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl GpsConfig {
    /// Get platform-specific default configuration
    pub fn platform_default() -> Self {
        #[cfg(windows)]
        let serial_port = "COM3".to_string();

        #[cfg(not(windows))]
        let serial_port = "/dev/ttyUSB0".to_string();

        Self {
            serial_port,
            serial_baudrate: 9600,
            read_timeout_ms: 2000,
            gather_interval_secs: 300,
            gather_on_startup: true,
            max_hdop: 5.0,
            on_partial_failure: PartialFailurePolicy::Discard,
            log_file: None,
        }
    }

    /// Load from the default location, falling back to defaults when no
    /// file exists there
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::platform_default());
        }

        Self::load_from_file(&config_path)
    }

    /// Load from an explicit path, which must exist
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            GpsError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            GpsError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to_file(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GpsError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(path, contents)
            .map_err(|e| GpsError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get config file path
    pub fn get_config_path() -> Result<PathBuf> {
        #[cfg(windows)]
        {
            let appdata = std::env::var("APPDATA")
                .map_err(|_| GpsError::Config("APPDATA environment variable not set".to_string()))?;
            Ok(PathBuf::from(appdata).join("gps-timesync").join("config.json"))
        }

        #[cfg(not(windows))]
        {
            let home = std::env::var("HOME")
                .map_err(|_| GpsError::Config("HOME environment variable not set".to_string()))?;
            Ok(PathBuf::from(home).join(".config").join("gps-timesync").join("config.json"))
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.serial_port.is_empty() {
            return Err(GpsError::Config("serial_port must not be empty".to_string()));
        }
        if self.serial_baudrate == 0 {
            return Err(GpsError::Config("serial_baudrate must be positive".to_string()));
        }
        if self.gather_interval_secs == 0 {
            return Err(GpsError::Config("gather_interval_secs must be positive".to_string()));
        }
        if !(self.max_hdop > 0.0) {
            return Err(GpsError::Config(format!("max_hdop must be positive, got {}", self.max_hdop)));
        }
        Ok(())
    }

    /// Update serial port settings
    pub fn update_serial(&mut self, port: String, baudrate: u32) {
        self.serial_port = port;
        self.serial_baudrate = baudrate;
    }

    pub fn gather_interval(&self) -> Duration {
        Duration::from_secs(self.gather_interval_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
