//! Registry-backed store

use super::Hive;
use super::store::CompatStore;
use crate::error::{CompatError, Result};
use std::io::ErrorKind;
use tracing::debug;
use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WRITE};

/// A registry key whose string values are the store entries
///
/// The key is reopened for every operation; the store holds no handle.
#[derive(Debug)]
pub struct RegistryStore {
    hive: Hive,
    path: String,
    location: String,
}

impl RegistryStore {
    /// Open (creating if needed) `path` under the root of `hive`
    pub fn open(hive: Hive, path: &str) -> Result<Self> {
        let root_name = match hive {
            Hive::CurrentUser => "HKEY_CURRENT_USER",
            Hive::LocalMachine => "HKEY_LOCAL_MACHINE",
        };
        let location = format!("{root_name}\\{path}");
        Self::root(hive)
            .create_subkey_with_flags(path, KEY_READ | KEY_WRITE)
            .map_err(|e| {
                debug!("Cannot open {}: {}", location, e);
                CompatError::StoreUnavailable(location.clone())
            })?;
        Ok(Self {
            hive,
            path: path.to_string(),
            location,
        })
    }

    fn root(hive: Hive) -> RegKey {
        match hive {
            Hive::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
            Hive::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
        }
    }

    fn key(&self, flags: u32) -> Result<RegKey> {
        Self::root(self.hive)
            .open_subkey_with_flags(&self.path, flags)
            .map_err(|e| CompatError::StoreAccessFailed(Box::new(e)))
    }
}

impl CompatStore for RegistryStore {
    fn location(&self) -> &str {
        &self.location
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        match self.key(KEY_READ)?.get_value::<String, _>(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CompatError::StoreAccessFailed(Box::new(e))),
        }
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.key(KEY_WRITE)?
            .set_value(name, &value)
            .map_err(|e| CompatError::StoreAccessFailed(Box::new(e)))
    }

    fn delete(&self, name: &str) -> Result<()> {
        match self.key(KEY_WRITE)?.delete_value(name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CompatError::EntryNotFound(name.to_string()))
            }
            Err(e) => Err(CompatError::StoreAccessFailed(Box::new(e))),
        }
    }

    fn names(&self) -> Result<Vec<String>> {
        self.key(KEY_READ)?
            .enum_values()
            .map(|entry| {
                entry
                    .map(|(name, _)| name)
                    .map_err(|e| CompatError::StoreAccessFailed(Box::new(e)))
            })
            .collect()
    }
}
