//! Process elevation
//!
//! The machine-wide `HKEY_LOCAL_MACHINE` layers key is only writable from an
//! elevated process. The editor checks elevation once at startup and can
//! relaunch itself through the UAC prompt.

use crate::error::Result;

/// Whether the current process runs with administrator rights
#[cfg(windows)]
#[expect(unsafe_code, reason = "Windows FFI call to IsUserAnAdmin")]
pub fn is_elevated() -> bool {
    use windows::Win32::UI::Shell::IsUserAnAdmin;

    // SAFETY: IsUserAnAdmin takes no arguments and only reads the process token.
    unsafe { IsUserAnAdmin().as_bool() }
}

/// Whether the current process runs with administrator rights (never off Windows)
#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    false
}

/// Outcome of an elevation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// An elevated copy was started; the caller should exit
    Relaunched,
    /// The user declined the UAC prompt; keep running unelevated
    Declined,
}

/// Relaunch the current executable through the `runas` verb
#[cfg(windows)]
#[expect(unsafe_code, reason = "Windows FFI call to ShellExecuteW")]
pub fn elevate() -> Result<Elevation> {
    use crate::error::CompatError;
    use tracing::{info, warn};
    use windows::Win32::UI::Shell::ShellExecuteW;
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;
    use windows::core::{HSTRING, PCWSTR, w};

    // ShellExecute reports failures as values <= 32
    const SE_ERR_ACCESSDENIED: isize = 5;

    let exe = std::env::current_exe()?;
    let file = HSTRING::from(exe.as_os_str());

    // SAFETY: every string argument is a valid null-terminated wide string that
    // outlives the call; the remaining pointers are null as documented.
    let instance = unsafe {
        ShellExecuteW(
            None,
            w!("runas"),
            &file,
            PCWSTR::null(),
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };

    let code = instance.0 as isize;
    if code > 32 {
        info!("Relaunched elevated instance: {}", exe.display());
        Ok(Elevation::Relaunched)
    } else if code == SE_ERR_ACCESSDENIED {
        warn!("UAC prompt declined, staying unelevated");
        Ok(Elevation::Declined)
    } else {
        Err(CompatError::ElevationFailed(crate::error::StringError::new(
            format!("ShellExecuteW returned {code}"),
        )))
    }
}

/// Relaunch the current executable elevated (unsupported off Windows)
#[cfg(not(windows))]
pub fn elevate() -> Result<Elevation> {
    Err(crate::error::CompatError::UnsupportedPlatform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(windows))]
    fn test_never_elevated_off_windows() {
        assert!(!is_elevated());
        assert!(elevate().is_err());
    }
}
