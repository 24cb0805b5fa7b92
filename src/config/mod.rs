//! Configuration management module
//!
//! This module handles loading, saving, and managing user preferences.
//! Preferences are stored in %APPDATA%\CompatManager\config.json with atomic
//! writes to prevent corruption.

pub mod manager;
pub mod models;

pub use manager::ConfigManager;
pub use models::{AppConfig, LastUsedValues, WindowState};
