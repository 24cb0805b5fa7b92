//! Independent single-word compatibility flags

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// Bit set over the miscellaneous compatibility flags
///
/// Each flag is written as exactly one word. Tokens are emitted in the fixed
/// declaration order of [`OtherFlags::ALL`], never in the order they were read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OtherFlags(u8);

impl OtherFlags {
    /// No flag set
    pub const NONE: Self = Self(0b000);
    /// Run in 640 x 480 screen resolution
    pub const RESOLUTION_640X480: Self = Self(0b001);
    /// Disable fullscreen optimizations
    pub const DISABLE_FULLSCREEN_OPTIMIZATIONS: Self = Self(0b010);
    /// Run this program as an administrator
    pub const RUN_AS_ADMIN: Self = Self(0b100);

    /// Every single flag in declaration order
    pub const ALL: [Self; 3] = [
        Self::RESOLUTION_640X480,
        Self::DISABLE_FULLSCREEN_OPTIMIZATIONS,
        Self::RUN_AS_ADMIN,
    ];

    const MASK: u8 = 0b111;

    /// Raw bit representation
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build a set from raw bits, dropping unknown bits
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// Whether no flag is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is set in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set or clear the bits of `flag`
    pub fn set(&mut self, flag: Self, value: bool) {
        if value {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }

    /// Canonical token of a single flag; empty for `NONE` or a combination
    pub fn token(self) -> &'static str {
        match self {
            Self::RESOLUTION_640X480 => "640X480",
            Self::DISABLE_FULLSCREEN_OPTIMIZATIONS => "DISABLEDXMAXIMIZEDWINDOWEDMODE",
            Self::RUN_AS_ADMIN => "RUNASADMIN",
            _ => "",
        }
    }

    /// Human readable name of a single flag
    pub fn label(self) -> &'static str {
        match self {
            Self::RESOLUTION_640X480 => "Run in 640 x 480 screen resolution",
            Self::DISABLE_FULLSCREEN_OPTIMIZATIONS => "Disable fullscreen optimizations",
            Self::RUN_AS_ADMIN => "Run this program as an administrator",
            _ => "",
        }
    }

    /// Look up a single flag by exact token equality
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.token() == token)
    }

    /// Iterate over the single flags that are set, in declaration order
    pub fn iter(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |flag| self.contains(*flag))
    }

    /// Space-joined tokens of every set flag, in declaration order
    pub fn to_registry_string(self) -> String {
        self.iter()
            .map(Self::token)
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BitOr for OtherFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for OtherFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for OtherFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for OtherFlags {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}
