//! Configuration file support for dmmap.
//!
//! This module provides serialization and deserialization of user settings,
//! allowing the zoom behavior and log verbosity to be tuned without rebuilding.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DOCUMENT_FILENAME, MAX_ZOOM_MULTIPLIER, ZOOM_STEP};
use crate::zoom_math::Viewport;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Settings that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: MapPreferences,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPreferences {
    /// Factor applied by one zoom step
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    /// Maximum zoom as a multiple of the fit-to-viewport zoom
    #[serde(default = "default_max_zoom_multiplier")]
    pub max_zoom_multiplier: f32,

    /// File name offered when saving a map
    #[serde(default = "default_filename")]
    pub default_filename: String,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_zoom_step() -> f32 {
    ZOOM_STEP
}

fn default_max_zoom_multiplier() -> f32 {
    MAX_ZOOM_MULTIPLIER
}

fn default_filename() -> String {
    DEFAULT_DOCUMENT_FILENAME.to_string()
}

impl Default for MapPreferences {
    fn default() -> Self {
        Self {
            zoom_step: default_zoom_step(),
            max_zoom_multiplier: default_max_zoom_multiplier(),
            default_filename: default_filename(),
            log_level: LogLevel::default(),
        }
    }
}

impl MapConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: MapPreferences::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        let prefs = &config.preferences;
        if !(prefs.zoom_step.is_finite() && prefs.zoom_step > 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "zoom_step",
                message: format!("must be greater than 1, got {}", prefs.zoom_step),
            });
        }
        if !(prefs.max_zoom_multiplier.is_finite() && prefs.max_zoom_multiplier >= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "max_zoom_multiplier",
                message: format!("must be at least 1, got {}", prefs.max_zoom_multiplier),
            });
        }

        Ok(config)
    }

    /// A viewport using the configured zoom step and multiplier.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.preferences.zoom_step,
            self.preferences.max_zoom_multiplier,
        )
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "dmmap-config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("dmmap").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("dmmap")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A setting is outside its allowed range
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
