//! Compatibility layer storage
//!
//! Per-application layers live as string values under
//! `Software\Microsoft\Windows NT\CurrentVersion\AppCompatFlags\Layers`, one
//! value per executable path, in both HKCU and HKLM. The machine-wide key is
//! only writable when elevated. The global layer is the `__COMPAT_LAYER`
//! value in `HKCU\Environment`.

pub mod store;
#[cfg(windows)]
mod winreg_store;

pub use store::{CompatStore, MemoryStore};
#[cfg(windows)]
pub use winreg_store::RegistryStore;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Layers key path below the hive root
pub const LAYERS_KEY: &str = r"Software\Microsoft\Windows NT\CurrentVersion\AppCompatFlags\Layers";

/// User environment key holding the global layer
pub const ENVIRONMENT_KEY: &str = "Environment";

/// Environment variable applying layers to every process started afterwards
pub const GLOBAL_VALUE_NAME: &str = "__COMPAT_LAYER";

/// Name the global layer is listed under
pub const GLOBAL_DISPLAY_NAME: &str = "Global";

/// Registry hive holding a layers key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hive {
    /// HKEY_CURRENT_USER
    CurrentUser,
    /// HKEY_LOCAL_MACHINE
    LocalMachine,
}

impl Hive {
    /// Display name
    pub fn label(self) -> &'static str {
        match self {
            Self::CurrentUser => "Current User",
            Self::LocalMachine => "All Users",
        }
    }

    /// Whether writing this hive needs an elevated process
    pub fn requires_elevation(self) -> bool {
        self == Self::LocalMachine
    }
}

/// Open the layers key of `hive`
///
/// Returns `None` when the hive needs elevation and the process is not
/// elevated, or when the key cannot be opened; the caller hides that list.
pub fn open_layers_store(hive: Hive, elevated: bool) -> Option<Arc<dyn CompatStore>> {
    if hive.requires_elevation() && !elevated {
        return None;
    }
    match open_hive_key(hive, LAYERS_KEY) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("{} layers unavailable: {}", hive.label(), e);
            None
        }
    }
}

/// Open the user environment key holding the global layer
pub fn open_environment_store() -> Option<Arc<dyn CompatStore>> {
    match open_hive_key(Hive::CurrentUser, ENVIRONMENT_KEY) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Global layer unavailable: {}", e);
            None
        }
    }
}

#[cfg(windows)]
fn open_hive_key(hive: Hive, path: &str) -> Result<Arc<dyn CompatStore>> {
    Ok(Arc::new(RegistryStore::open(hive, path)?))
}

#[cfg(not(windows))]
fn open_hive_key(_hive: Hive, _path: &str) -> Result<Arc<dyn CompatStore>> {
    Err(crate::error::CompatError::UnsupportedPlatform)
}
