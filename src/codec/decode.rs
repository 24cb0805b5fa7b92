//! Layer string decoding

use super::CompatFlags;
use crate::flags::{OtherFlags, RegistryToken, TILDE};
use crate::platform::OsVersion;
use smallvec::SmallVec;
use tracing::debug;

/// Decode a layer string into typed settings
///
/// `None`, empty and whitespace-only input all decode to the zero value.
pub fn decode<'a>(line: impl Into<Option<&'a str>>, os: OsVersion) -> CompatFlags {
    let Some(line) = line.into() else {
        return CompatFlags::default();
    };

    let mut words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return CompatFlags::default();
    }

    if os.is_windows8_or_above()
        && let Some(index) = words.iter().position(|word| *word == TILDE)
    {
        words.remove(index);
    }

    let compatibility_mode = take_enum(&mut words);
    let color_mode = take_enum(&mut words);
    let dpi_scaling = take_enum(&mut words);
    let other_flags = take_flags(&mut words);

    let flags = CompatFlags {
        compatibility_mode,
        color_mode,
        dpi_scaling,
        other_flags,
        additional_flags: words.into_iter().map(str::to_owned).collect(),
    };
    debug!("Decoded '{}' as {:?}", line, flags);
    flags
}

/// Bind the first value (scanning from the last declared) whose token words
/// are all present, consuming one occurrence of each of those words.
fn take_enum<T: RegistryToken>(words: &mut Vec<&str>) -> T {
    for value in T::ALL.iter().rev().copied().filter(|value| !value.is_none()) {
        let token: SmallVec<[&str; 2]> = value.token().split_whitespace().collect();
        if !token.iter().all(|word| words.contains(word)) {
            continue;
        }
        for word in &token {
            if let Some(index) = words.iter().position(|w| w == word) {
                words.remove(index);
            }
        }
        return value;
    }
    T::default()
}

fn take_flags(words: &mut Vec<&str>) -> OtherFlags {
    let mut flags = OtherFlags::NONE;
    words.retain(|word| match OtherFlags::from_token(word) {
        Some(flag) => {
            flags |= flag;
            false
        }
        None => true,
    });
    flags
}
