//! Windows version detection
//!
//! The layer string format depends on the running Windows release: Windows 8
//! and later prefix every non-empty string with `~`.

use crate::error::{CompatError, Result};

/// Windows release families that matter for AppCompatFlags handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OsVersion {
    /// Windows 2000 (5.0)
    Windows2000,
    /// Windows XP / Server 2003 (5.1, 5.2)
    WindowsXp,
    /// Windows Vista (6.0)
    WindowsVista,
    /// Windows 7 (6.1)
    Windows7,
    /// Windows 8 (6.2)
    Windows8,
    /// Windows 8.1 (6.3)
    Windows8_1,
    /// Windows 10 and Windows 11 (10.0)
    Windows10,
}

impl OsVersion {
    /// Map an NT major/minor version pair to a release family
    pub fn from_version(major: u32, minor: u32) -> Result<Self> {
        match (major, minor) {
            (10.., _) => Ok(Self::Windows10),
            (6, 3..) => Ok(Self::Windows8_1),
            (6, 2) => Ok(Self::Windows8),
            (6, 1) => Ok(Self::Windows7),
            (6, 0) => Ok(Self::WindowsVista),
            (5, 1..) => Ok(Self::WindowsXp),
            (5, 0) => Ok(Self::Windows2000),
            _ => Err(CompatError::UnsupportedOsVersion { major, minor }),
        }
    }

    /// Whether layer strings carry the `~` prefix on this release
    pub fn is_windows8_or_above(self) -> bool {
        self >= Self::Windows8
    }

    /// Whether UAC elevation exists on this release
    pub fn is_vista_or_above(self) -> bool {
        self >= Self::WindowsVista
    }

    /// Detect the running Windows release
    ///
    /// Uses `RtlGetVersion` from ntdll.dll, which is not subject to the
    /// manifest-based version lie of `GetVersionEx`.
    #[cfg(windows)]
    pub fn detect() -> Result<Self> {
        let (major, minor) = rtl_get_version()?;
        tracing::debug!("RtlGetVersion reported {}.{}", major, minor);
        Self::from_version(major, minor)
    }

    /// Detect the running Windows release (always fails off Windows)
    #[cfg(not(windows))]
    pub fn detect() -> Result<Self> {
        Err(CompatError::UnsupportedPlatform)
    }
}

/// Query the NT major/minor version through `RtlGetVersion`.
///
/// # Safety
///
/// ntdll.dll and `RtlGetVersion` are always present on Windows; the function
/// pointer is checked before the transmute, the structure size field is set,
/// and the status is checked before the data is read.
#[cfg(windows)]
#[expect(
    unsafe_code,
    reason = "Required for Windows FFI to call RtlGetVersion from ntdll.dll"
)]
fn rtl_get_version() -> Result<(u32, u32)> {
    use crate::error::StringError;
    use std::mem::{size_of, transmute};
    use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
    use windows::Win32::System::SystemInformation::OSVERSIONINFOEXW;
    use windows::core::HSTRING;

    type RtlGetVersionFn = unsafe extern "system" fn(*mut OSVERSIONINFOEXW) -> i32;

    unsafe {
        let ntdll = LoadLibraryW(&HSTRING::from("ntdll.dll"))?;

        let Some(proc_address) = GetProcAddress(ntdll, windows::core::s!("RtlGetVersion")) else {
            return Err(CompatError::ConfigError(StringError::new(
                "RtlGetVersion not found in ntdll.dll",
            )));
        };
        let rtl_get_version: RtlGetVersionFn = transmute(proc_address);

        #[expect(
            clippy::cast_possible_truncation,
            reason = "size_of::<OSVERSIONINFOEXW>() is a compile-time constant that fits in u32"
        )]
        let mut info = OSVERSIONINFOEXW {
            dwOSVersionInfoSize: size_of::<OSVERSIONINFOEXW>() as u32,
            ..Default::default()
        };

        let status = rtl_get_version(&raw mut info);
        if status != 0 {
            return Err(CompatError::ConfigError(StringError::new(format!(
                "RtlGetVersion failed with status: {status}"
            ))));
        }

        Ok((info.dwMajorVersion, info.dwMinorVersion))
    }
}
