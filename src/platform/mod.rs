//! Platform services
//!
//! Thin wrappers around the few Windows facilities the editor needs besides
//! the registry: version detection, elevation, and the environment-change
//! broadcast that makes a new global `__COMPAT_LAYER` value visible without
//! restarting Explorer.

pub mod privileges;
pub mod version;

pub use privileges::{Elevation, elevate, is_elevated};
pub use version::OsVersion;

/// Tell running applications that the user environment block changed
#[cfg(windows)]
#[expect(unsafe_code, reason = "Windows FFI call to SendNotifyMessageW")]
pub fn notify_environment_changed() {
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{
        HWND_BROADCAST, SendNotifyMessageW, WM_SETTINGCHANGE,
    };
    use windows::core::w;

    let area = w!("Environment");

    // SAFETY: `area` is a static null-terminated wide string; the system marshals
    // WM_SETTINGCHANGE string parameters for broadcast recipients.
    let result = unsafe {
        SendNotifyMessageW(
            HWND_BROADCAST,
            WM_SETTINGCHANGE,
            WPARAM(0),
            LPARAM(area.as_ptr() as isize),
        )
    };

    match result {
        Ok(()) => tracing::debug!("Broadcast WM_SETTINGCHANGE(Environment)"),
        Err(e) => tracing::warn!("Failed to broadcast environment change: {}", e),
    }
}

/// Tell running applications that the user environment block changed (no-op off Windows)
#[cfg(not(windows))]
pub fn notify_environment_changed() {
    tracing::debug!("Environment change broadcast skipped on this platform");
}
