#![no_main]

use compat_manager::codec;
use compat_manager::platform::OsVersion;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding must accept anything, and a decoded line must survive a re-encode
    if let Ok(line) = std::str::from_utf8(data) {
        for os in [OsVersion::Windows7, OsVersion::Windows10] {
            let flags = codec::decode(line, os);
            let reencoded = codec::encode(&flags, os);
            assert_eq!(codec::decode(reencoded.as_str(), os), flags);
        }
    }
});
