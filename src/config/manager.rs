//! Configuration manager for loading and saving preferences
//!
//! This module provides functionality to load and save configuration to
//! %APPDATA%\CompatManager\config.json with atomic writes to prevent corruption.

use crate::config::models::AppConfig;
use crate::error::{CompatError, Result, StringError};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the path to the configuration file
    ///
    /// Returns: %APPDATA%\CompatManager\config.json
    pub fn get_config_path() -> PathBuf {
        Self::get_data_dir().join("config.json")
    }

    /// Get the per-user data directory shared by the config file and logs
    pub fn get_data_dir() -> PathBuf {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("CompatManager")
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist or is corrupt, returns default configuration.
    pub fn load() -> Result<AppConfig> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let json = std::fs::read_to_string(&config_path)?;

        match serde_json::from_str(&json) {
            Ok(config) => {
                info!("Configuration loaded from {}", config_path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Save configuration to disk with atomic write
    ///
    /// Writes to a temporary file in the same directory, then persists it over
    /// the real file so a crash never leaves a truncated config behind.
    pub fn save(config: &AppConfig) -> Result<()> {
        let config_path = Self::get_config_path();
        let config_dir = config_path
            .parent()
            .ok_or_else(|| CompatError::ConfigError(StringError::new("Invalid config path")))?;
        std::fs::create_dir_all(config_dir)?;

        let json = serde_json::to_string_pretty(config)?;
        let mut temp_file = tempfile::NamedTempFile::new_in(config_dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file
            .persist(&config_path)
            .map_err(|e| CompatError::IoError(e.error))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}
