//! Layer string encoding

use super::CompatFlags;
use crate::flags::{RegistryToken, TILDE};
use crate::platform::OsVersion;

/// Encode typed settings into a layer string
///
/// An empty result means "no settings": the caller deletes the registry value
/// instead of writing an empty string.
pub fn encode(flags: &CompatFlags, os: OsVersion) -> String {
    let other_flags = flags.other_flags.to_registry_string();

    let tokens: Vec<&str> = [
        flags.compatibility_mode.token(),
        flags.color_mode.token(),
        flags.dpi_scaling.token(),
        other_flags.as_str(),
    ]
    .into_iter()
    .chain(flags.additional_flags.iter().map(String::as_str))
    .filter(|token| !token.trim().is_empty())
    .collect();

    if tokens.is_empty() {
        return String::new();
    }

    let line = tokens.join(" ");
    if os.is_windows8_or_above() {
        format!("{TILDE} {line}")
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{ColorMode, CompatibilityMode, DpiScaling, OtherFlags};

    #[test]
    fn test_windows8_prefix() {
        let flags = CompatFlags {
            compatibility_mode: CompatibilityMode::Win7Rtm,
            ..CompatFlags::default()
        };
        assert_eq!(encode(&flags, OsVersion::Windows8), "~ WIN7RTM");
        assert_eq!(encode(&flags, OsVersion::Windows10), "~ WIN7RTM");
        assert_eq!(encode(&flags, OsVersion::Windows7), "WIN7RTM");
    }

    #[test]
    fn test_empty_settings_encode_to_empty_string() {
        assert_eq!(encode(&CompatFlags::default(), OsVersion::Windows10), "");

        let blank_extra = CompatFlags {
            additional_flags: vec![String::new(), " ".to_string()],
            ..CompatFlags::default()
        };
        assert_eq!(encode(&blank_extra, OsVersion::Windows10), "");
    }

    #[test]
    fn test_fixed_token_order() {
        let flags = CompatFlags {
            compatibility_mode: CompatibilityMode::WinXpSp3,
            color_mode: ColorMode::Color16Bit,
            dpi_scaling: DpiScaling::GdiDpiScaling,
            other_flags: OtherFlags::RUN_AS_ADMIN | OtherFlags::DISABLE_FULLSCREEN_OPTIMIZATIONS,
            additional_flags: vec!["ZZZ".to_string(), "AAA".to_string()],
        };
        assert_eq!(
            encode(&flags, OsVersion::Windows7),
            "WINXPSP3 BITCOLOR GDIDPISCALING DPIUNAWARE \
             DISABLEDXMAXIMIZEDWINDOWEDMODE RUNASADMIN ZZZ AAA"
        );
    }

    #[test]
    fn test_skips_missing_categories() {
        let flags = CompatFlags {
            dpi_scaling: DpiScaling::HighDpiAware,
            other_flags: OtherFlags::RESOLUTION_640X480,
            ..CompatFlags::default()
        };
        assert_eq!(encode(&flags, OsVersion::Windows10), "~ HIGHDPIAWARE 640X480");
    }
}
