//! Configuration management for MotionKit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into two sections:
//! - Connection settings (port, baud rate, reply timeout)
//! - Device settings (which driver to use, calibration)

use motionkit_core::{Calibration, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Serial port path, or "auto" to discover a Sutter controller
    pub port: String,
    /// Baud rate for serial connections
    pub baud_rate: u32,
    /// Reply timeout in milliseconds
    pub timeout_ms: u64,
}

impl ConnectionSettings {
    /// Reply timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: "auto".to_string(),
            baud_rate: 128_000,
            timeout_ms: 5000,
        }
    }
}

/// Motion device variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// In-memory stand-in
    #[default]
    Debug,
    /// Sutter Instrument stage over serial
    Sutter,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Sutter => write!(f, "sutter"),
        }
    }
}

/// Device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Which driver to use
    pub kind: DeviceKind,
    /// Steps per micron
    pub steps_per_micron: f64,
}

impl DeviceSettings {
    /// Calibration described by these settings
    pub fn calibration(&self) -> Result<Calibration> {
        Ok(Calibration::new(self.steps_per_micron)?)
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            kind: DeviceKind::Debug,
            steps_per_micron: Calibration::SIXTEEN_MICROSTEPS.steps_per_micron(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Device settings
    pub device: DeviceSettings,
}

impl Config {
    /// Create new default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::other(format!("Failed to read config file: {}", e)))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid JSON config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)
                .map_err(|e| Error::other(format!("Invalid TOML config: {}", e)))?
        } else {
            return Err(Error::other("Config file must be .json or .toml"));
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load config from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| Error::other(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(Error::other("Config file must be .json or .toml"));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::other(format!("Failed to create config directory: {}", e)))?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::other(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.connection.port.trim().is_empty() {
            return Err(Error::other("Connection port must not be empty"));
        }

        if self.connection.timeout_ms == 0 {
            return Err(Error::other("Connection timeout must be > 0"));
        }

        if self.connection.baud_rate == 0 {
            return Err(Error::other("Baud rate must be > 0"));
        }

        self.device.calibration()?;
        Ok(())
    }
}

/// Default location of the configuration file
///
/// `<config dir>/motionkit/config.toml`, falling back to the working directory
/// when the platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("motionkit")
        .join("config.toml")
}
