//! Configuration data models
//!
//! This module defines the data structures persisted between sessions.

use crate::flags::{ColorMode, CompatibilityMode, DpiScaling};
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Values used to pre-fill a category when its checkbox is ticked
    #[serde(default)]
    pub last_used: LastUsedValues,
    /// Window state for persistence
    #[serde(default)]
    pub window_state: WindowState,
}

/// Last enum values picked by the user
///
/// Ticking a category whose stored value is `None` starts from these instead
/// of leaving the selector empty. None of the fields is ever `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUsedValues {
    /// Last compatibility mode
    pub compatibility_mode: CompatibilityMode,
    /// Last color mode
    pub color_mode: ColorMode,
    /// Last DPI scaling override
    pub dpi_scaling: DpiScaling,
}

impl LastUsedValues {
    /// Record a freshly picked compatibility mode; `None` is ignored
    pub fn remember_compatibility_mode(&mut self, mode: CompatibilityMode) -> bool {
        let changed = mode != CompatibilityMode::None && mode != self.compatibility_mode;
        if changed {
            self.compatibility_mode = mode;
        }
        changed
    }

    /// Record a freshly picked color mode; `None` is ignored
    pub fn remember_color_mode(&mut self, mode: ColorMode) -> bool {
        let changed = mode != ColorMode::None && mode != self.color_mode;
        if changed {
            self.color_mode = mode;
        }
        changed
    }

    /// Record a freshly picked DPI scaling override; `None` is ignored
    pub fn remember_dpi_scaling(&mut self, scaling: DpiScaling) -> bool {
        let changed = scaling != DpiScaling::None && scaling != self.dpi_scaling;
        if changed {
            self.dpi_scaling = scaling;
        }
        changed
    }
}

/// Window state for position and size persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    /// X position
    pub x: i32,
    /// Y position
    pub y: i32,
    /// Window width
    pub width: u32,
    /// Window height
    pub height: u32,
}

impl Default for LastUsedValues {
    fn default() -> Self {
        Self {
            compatibility_mode: CompatibilityMode::Win7Rtm,
            color_mode: ColorMode::Color256,
            dpi_scaling: DpiScaling::HighDpiAware,
        }
    }
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 900,
            height: 600,
        }
    }
}
