//! Compatibility mode (emulated Windows release)

use super::RegistryToken;
use serde::{Deserialize, Serialize};

/// Windows release an application is told it is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompatibilityMode {
    /// No compatibility mode
    #[default]
    None,
    /// Windows 95
    Win95,
    /// Windows 98 / Windows ME
    Win98,
    /// Windows XP (Service Pack 2)
    WinXpSp2,
    /// Windows XP (Service Pack 3)
    WinXpSp3,
    /// Windows Vista
    VistaRtm,
    /// Windows Vista (Service Pack 1)
    VistaSp1,
    /// Windows Vista (Service Pack 2)
    VistaSp2,
    /// Windows 7
    Win7Rtm,
    /// Windows 8
    Win8Rtm,
}

impl RegistryToken for CompatibilityMode {
    const ALL: &'static [Self] = &[
        Self::None,
        Self::Win95,
        Self::Win98,
        Self::WinXpSp2,
        Self::WinXpSp3,
        Self::VistaRtm,
        Self::VistaSp1,
        Self::VistaSp2,
        Self::Win7Rtm,
        Self::Win8Rtm,
    ];

    fn token(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Win95 => "WIN95",
            Self::Win98 => "WIN98",
            Self::WinXpSp2 => "WINXPSP2",
            Self::WinXpSp3 => "WINXPSP3",
            Self::VistaRtm => "VISTARTM",
            Self::VistaSp1 => "VISTASP1",
            Self::VistaSp2 => "VISTASP2",
            Self::Win7Rtm => "WIN7RTM",
            Self::Win8Rtm => "WIN8RTM",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Win95 => "Windows 95",
            Self::Win98 => "Windows 98 / Windows ME",
            Self::WinXpSp2 => "Windows XP (Service Pack 2)",
            Self::WinXpSp3 => "Windows XP (Service Pack 3)",
            Self::VistaRtm => "Windows Vista",
            Self::VistaSp1 => "Windows Vista (Service Pack 1)",
            Self::VistaSp2 => "Windows Vista (Service Pack 2)",
            Self::Win7Rtm => "Windows 7",
            Self::Win8Rtm => "Windows 8",
        }
    }
}
