//! Reduced color mode

use super::RegistryToken;
use serde::{Deserialize, Serialize};

/// Reduced color depth forced on an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorMode {
    /// Native color depth
    #[default]
    None,
    /// 8-bit (256) color
    Color256,
    /// 16-bit (65536) color
    Color16Bit,
}

impl RegistryToken for ColorMode {
    const ALL: &'static [Self] = &[Self::None, Self::Color256, Self::Color16Bit];

    fn token(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Color256 => "256COLOR",
            Self::Color16Bit => "BITCOLOR",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Color256 => "8-bit (256) color",
            Self::Color16Bit => "16-bit (65536) color",
        }
    }
}
