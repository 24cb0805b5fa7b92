//! AppCompatFlags token vocabulary
//!
//! Every setting the editor understands maps to a fixed token (or fixed
//! multi-word phrase) in the `AppCompatFlags\Layers` registry string.
//!
//! # Overview
//!
//! - `CompatibilityMode`: emulated Windows release (`WIN95` .. `WIN8RTM`)
//! - `ColorMode`: reduced color depth (`256COLOR`, `BITCOLOR`)
//! - `DpiScaling`: DPI override (`HIGHDPIAWARE`, `DPIUNAWARE`, `GDIDPISCALING DPIUNAWARE`)
//! - `OtherFlags`: independent single-word flags (`640X480`, `DISABLEDXMAXIMIZEDWINDOWEDMODE`, `RUNASADMIN`)
//!
//! The zero value of each type (`None`) is never written to the registry and
//! produces an empty token.
//!
//! # Token Tables
//!
//! Tokens live in static tables keyed by the enum value, exposed through the
//! `RegistryToken` trait. Table order is the declaration order, which the
//! decoder walks in reverse so that `GDIDPISCALING DPIUNAWARE` wins over the
//! `DPIUNAWARE` subset.

pub mod color_mode;
pub mod compatibility_mode;
pub mod dpi_scaling;
pub mod other_flags;

pub use color_mode::ColorMode;
pub use compatibility_mode::CompatibilityMode;
pub use dpi_scaling::DpiScaling;
pub use other_flags::OtherFlags;

/// A closed enumeration with a canonical AppCompatFlags token per value
pub trait RegistryToken: Copy + Eq + Default + std::fmt::Debug + 'static {
    /// Every value in declaration order, the `None` value first
    const ALL: &'static [Self];

    /// Canonical registry token; empty for the `None` value
    fn token(self) -> &'static str;

    /// Human readable name shown in selection lists
    fn label(self) -> &'static str;

    /// Whether this is the inactive zero value
    fn is_none(self) -> bool {
        self == Self::default()
    }

    /// Look up a value by its exact canonical token
    fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|value| !value.is_none() && value.token() == token)
    }

    /// Values that can be written to the registry (everything except `None`)
    fn browsable() -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied().filter(|value| !value.is_none())
    }
}

/// Prefix marker Windows 8 and later put in front of every non-empty layer string
pub const TILDE: &str = "~";

/// Check whether a single word belongs to any known token, including the `~` marker
pub fn is_vocabulary_word(word: &str) -> bool {
    fn in_table<T: RegistryToken>(word: &str) -> bool {
        T::browsable().any(|value| value.token().split_whitespace().any(|w| w == word))
    }

    word == TILDE
        || in_table::<CompatibilityMode>(word)
        || in_table::<ColorMode>(word)
        || in_table::<DpiScaling>(word)
        || OtherFlags::from_token(word).is_some()
}
