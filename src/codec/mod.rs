//! Layer string codec
//!
//! Converts between the typed settings tuple and the single-line,
//! space-delimited value stored under `AppCompatFlags\Layers`.
//!
//! # Wire Format
//!
//! ```text
//! ["~ "] [<CompatibilityMode>] [<ColorMode>] [<DpiScaling>] [<OtherFlags>...] [<Additional>...]
//! ```
//!
//! Empty tokens are omitted. The leading `~` appears only on Windows 8 and
//! above, and only when at least one other token is present.
//!
//! # Decoding
//!
//! Decoding never fails. The three enums are matched in a fixed priority
//! order, each scanning its values from the last declared to the first and
//! requiring *every* word of a value's token to be present. This is what
//! keeps `GDIDPISCALING DPIUNAWARE` from being read as plain `DPIUNAWARE`.
//! Flags are then matched by exact word equality, and whatever remains is
//! kept verbatim, in order, as additional flags.
//!
//! # Example Usage
//!
//! ```
//! use compat_manager::codec;
//! use compat_manager::flags::{CompatibilityMode, DpiScaling, OtherFlags};
//! use compat_manager::platform::OsVersion;
//!
//! let flags = codec::decode("~ WIN7RTM GDIDPISCALING DPIUNAWARE RUNASADMIN", OsVersion::Windows10);
//! assert_eq!(flags.compatibility_mode, CompatibilityMode::Win7Rtm);
//! assert_eq!(flags.dpi_scaling, DpiScaling::GdiDpiScaling);
//! assert_eq!(flags.other_flags, OtherFlags::RUN_AS_ADMIN);
//! assert!(flags.additional_flags.is_empty());
//!
//! let line = codec::encode(&flags, OsVersion::Windows10);
//! assert_eq!(line, "~ WIN7RTM GDIDPISCALING DPIUNAWARE RUNASADMIN");
//! ```

mod decode;
mod encode;

pub use decode::decode;
pub use encode::encode;

use crate::error::{CompatError, Result};
use crate::flags::{ColorMode, CompatibilityMode, DpiScaling, OtherFlags, is_vocabulary_word};
use serde::{Deserialize, Serialize};

/// Everything a single layer string carries
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompatFlags {
    /// Emulated Windows release
    pub compatibility_mode: CompatibilityMode,
    /// Reduced color mode
    pub color_mode: ColorMode,
    /// DPI scaling override
    pub dpi_scaling: DpiScaling,
    /// Independent single-word flags
    pub other_flags: OtherFlags,
    /// Unrecognized words, kept verbatim and in order
    pub additional_flags: Vec<String>,
}

impl CompatFlags {
    /// Whether encoding these flags yields an empty string
    pub fn is_empty(&self) -> bool {
        self.compatibility_mode == CompatibilityMode::None
            && self.color_mode == ColorMode::None
            && self.dpi_scaling == DpiScaling::None
            && self.other_flags.is_empty()
            && self.additional_flags.iter().all(|flag| flag.trim().is_empty())
    }
}

/// Check a user-entered additional flag before it is stored
///
/// An empty entry is a placeholder and is accepted (it is dropped on encode).
/// Anything else must be one word that is not part of the known vocabulary,
/// otherwise the next decode would fold it into a typed setting.
pub fn validate_additional_flag(flag: &str) -> Result<()> {
    validate_single_word(flag)?;
    if !flag.is_empty() && is_vocabulary_word(flag) {
        return Err(CompatError::ReservedToken(flag.to_string()));
    }
    Ok(())
}

/// Check that an additional flag is empty or exactly one word
///
/// Leftovers produced by [`decode()`] always pass; they may repeat vocabulary
/// words (a second compatibility mode, a `~` on a legacy host) and are kept
/// verbatim.
pub fn validate_single_word(flag: &str) -> Result<()> {
    if flag.is_empty() {
        return Ok(());
    }
    if flag.split_whitespace().count() != 1 || flag.trim() != flag {
        return Err(CompatError::InvalidAdditionalFlag(flag.to_string()));
    }
    Ok(())
}
