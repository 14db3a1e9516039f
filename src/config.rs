//! Configuration file support for GRIDSLICE.
//!
//! Serialization and deserialization of tool settings so users can carry
//! their defaults between sessions. Stored as JSON under the platform
//! config directory on native; the browser host persists the same JSON
//! blob however it likes.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EXPORT_PREFIX, DEFAULT_GRID, MAX_SPLITS, MIN_SPLITS};

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
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Tool configuration that can be exported and imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlicerConfig {
    /// Default number of rows for a new session
    #[serde(default = "default_grid")]
    pub default_rows: usize,

    /// Default number of columns for a new session
    #[serde(default = "default_grid")]
    pub default_cols: usize,

    /// Filename prefix for exported archives
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_grid() -> usize {
    DEFAULT_GRID
}

fn default_export_prefix() -> String {
    DEFAULT_EXPORT_PREFIX.to_string()
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            default_rows: default_grid(),
            default_cols: default_grid(),
            export_prefix: default_export_prefix(),
            log_level: LogLevel::default(),
        }
    }
}

impl SlicerConfig {
    /// Parse a config from its JSON representation, clamping grid counts
    /// into the supported range.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.default_rows = config.default_rows.clamp(MIN_SPLITS, MAX_SPLITS);
        config.default_cols = config.default_cols.clamp(MIN_SPLITS, MAX_SPLITS);
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Path of the config file under the platform config directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gridslice").join("config.json"))
    }

    /// Load the config from the platform config directory, falling back to
    /// defaults when the file is missing or unreadable.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Write the config to the platform config directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::default_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(&path, json)
    }
}
