//! High DPI scaling override

use super::RegistryToken;
use serde::{Deserialize, Serialize};

/// Who performs DPI scaling for an application
///
/// `GdiDpiScaling` is written as two words, the second of which is the whole
/// `DpiUnaware` token. Matching must therefore prefer the longer phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DpiScaling {
    /// No override
    #[default]
    None,
    /// Application
    HighDpiAware,
    /// System
    DpiUnaware,
    /// System (Enhanced)
    GdiDpiScaling,
}

impl RegistryToken for DpiScaling {
    const ALL: &'static [Self] = &[
        Self::None,
        Self::HighDpiAware,
        Self::DpiUnaware,
        Self::GdiDpiScaling,
    ];

    fn token(self) -> &'static str {
        match self {
            Self::None => "",
            Self::HighDpiAware => "HIGHDPIAWARE",
            Self::DpiUnaware => "DPIUNAWARE",
            Self::GdiDpiScaling => "GDIDPISCALING DPIUNAWARE",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::HighDpiAware => "Application",
            Self::DpiUnaware => "System",
            Self::GdiDpiScaling => "System (Enhanced)",
        }
    }
}
