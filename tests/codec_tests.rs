//! Layer string codec tests
//!
//! Fixed fixtures for the wire format plus a round-trip property over every
//! combination of settings.

use compat_manager::codec::{self, CompatFlags};
use compat_manager::flags::{ColorMode, CompatibilityMode, DpiScaling, OtherFlags, RegistryToken};
use compat_manager::platform::OsVersion;
use proptest::prelude::*;

const MODERN: OsVersion = OsVersion::Windows10;
const LEGACY: OsVersion = OsVersion::Windows7;

#[test]
fn test_gdi_scaling_is_not_read_as_dpi_unaware() {
    let flags = codec::decode("GDIDPISCALING DPIUNAWARE", MODERN);
    assert_eq!(flags.dpi_scaling, DpiScaling::GdiDpiScaling);
    assert!(flags.additional_flags.is_empty());

    let flags = codec::decode("~ DPIUNAWARE WIN98 GDIDPISCALING", MODERN);
    assert_eq!(flags.dpi_scaling, DpiScaling::GdiDpiScaling);
    assert_eq!(flags.compatibility_mode, CompatibilityMode::Win98);
    assert!(flags.additional_flags.is_empty());
}

#[test]
fn test_empty_and_absent_input() {
    for os in [MODERN, LEGACY] {
        assert_eq!(codec::decode("", os), CompatFlags::default());
        assert_eq!(codec::decode("   ", os), CompatFlags::default());
        assert_eq!(codec::decode(None, os), CompatFlags::default());
    }
}

#[test]
fn test_tilde_prefix_depends_on_os() {
    let flags = CompatFlags {
        compatibility_mode: CompatibilityMode::Win7Rtm,
        ..CompatFlags::default()
    };
    assert_eq!(codec::encode(&flags, OsVersion::Windows8), "~ WIN7RTM");
    assert_eq!(codec::encode(&flags, LEGACY), "WIN7RTM");
    assert_eq!(codec::encode(&CompatFlags::default(), MODERN), "");
}

#[test]
fn test_legacy_os_keeps_tilde_as_additional_flag() {
    let flags = codec::decode("~ WIN95", LEGACY);
    assert_eq!(flags.compatibility_mode, CompatibilityMode::Win95);
    assert_eq!(flags.additional_flags, vec!["~".to_string()]);
}

#[test]
fn test_leftovers_keep_relative_order() {
    let flags = codec::decode("WIN7RTM FOOBAR RUNASADMIN", LEGACY);
    assert_eq!(flags.compatibility_mode, CompatibilityMode::Win7Rtm);
    assert!(flags.other_flags.contains(OtherFlags::RUN_AS_ADMIN));
    assert_eq!(flags.additional_flags, vec!["FOOBAR".to_string()]);

    let flags = codec::decode("~ ZED RUNASADMIN ALPHA 256COLOR MID", MODERN);
    assert_eq!(flags.additional_flags, vec!["ZED", "ALPHA", "MID"]);
}

#[test]
fn test_flags_are_emitted_in_declaration_order() {
    let flags = codec::decode("~ RUNASADMIN DISABLEDXMAXIMIZEDWINDOWEDMODE 640X480", MODERN);
    assert_eq!(
        codec::encode(&flags, MODERN),
        "~ 640X480 DISABLEDXMAXIMIZEDWINDOWEDMODE RUNASADMIN"
    );
}

#[test]
fn test_full_line() {
    let line = "~ VISTASP2 BITCOLOR HIGHDPIAWARE 640X480 RUNASADMIN CUSTOMSHIM";
    let flags = codec::decode(line, MODERN);
    assert_eq!(flags.compatibility_mode, CompatibilityMode::VistaSp2);
    assert_eq!(flags.color_mode, ColorMode::Color16Bit);
    assert_eq!(flags.dpi_scaling, DpiScaling::HighDpiAware);
    assert_eq!(
        flags.other_flags,
        OtherFlags::RESOLUTION_640X480 | OtherFlags::RUN_AS_ADMIN
    );
    assert_eq!(codec::encode(&flags, MODERN), line);
}

#[test]
fn test_partial_token_is_not_a_flag() {
    let flags = codec::decode("RUNASADMINX 640X480X", MODERN);
    assert!(flags.other_flags.is_empty());
    assert_eq!(flags.additional_flags.len(), 2);
}

fn os_strategy() -> impl Strategy<Value = OsVersion> {
    prop_oneof![
        Just(OsVersion::WindowsXp),
        Just(OsVersion::Windows7),
        Just(OsVersion::Windows8),
        Just(OsVersion::Windows10),
    ]
}

fn flags_strategy() -> impl Strategy<Value = CompatFlags> {
    (
        proptest::sample::select(CompatibilityMode::ALL),
        proptest::sample::select(ColorMode::ALL),
        proptest::sample::select(DpiScaling::ALL),
        (0u8..8).prop_map(OtherFlags::from_bits_truncate),
        proptest::collection::vec("[a-z][a-z0-9_]{0,8}", 0..4),
    )
        .prop_map(
            |(compatibility_mode, color_mode, dpi_scaling, other_flags, additional_flags)| {
                CompatFlags {
                    compatibility_mode,
                    color_mode,
                    dpi_scaling,
                    other_flags,
                    additional_flags,
                }
            },
        )
}

proptest! {
    /// Property: decoding an encoded value gives the value back
    #[test]
    fn decode_inverts_encode(flags in flags_strategy(), os in os_strategy()) {
        let line = codec::encode(&flags, os);
        prop_assert_eq!(codec::decode(line.as_str(), os), flags);
    }

    /// Property: decoding never loses a word
    #[test]
    fn decode_accounts_for_every_word(line in "[A-Z0-9~ ]{0,40}") {
        let flags = codec::decode(line.as_str(), MODERN);
        let reencoded = codec::encode(&flags, MODERN);
        let mut before: Vec<&str> = line.split_whitespace().filter(|w| *w != "~").collect();
        let mut after: Vec<&str> = reencoded.split_whitespace().filter(|w| *w != "~").collect();
        before.sort_unstable();
        after.sort_unstable();
        before.dedup();
        after.dedup();
        prop_assert_eq!(before, after);
    }
}
