//! Key/value store abstraction over a registry key

use crate::error::{CompatError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A flat string-valued store, one entry per application path
///
/// Implemented by the Windows registry and by an in-memory map for tests.
/// Implementations must be usable from several threads at once.
pub trait CompatStore: Send + Sync + Debug {
    /// Human readable location, used in logs and errors
    fn location(&self) -> &str;

    /// Read an entry; `Ok(None)` when it does not exist
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Create or overwrite an entry
    fn set(&self, name: &str, value: &str) -> Result<()>;

    /// Delete an entry; `EntryNotFound` when it does not exist
    fn delete(&self, name: &str) -> Result<()>;

    /// Names of all entries
    fn names(&self) -> Result<Vec<String>>;

    /// Delete an entry, treating a missing entry as success
    fn delete_if_present(&self, name: &str) -> Result<()> {
        match self.delete(name) {
            Err(CompatError::EntryNotFound(_)) => Ok(()),
            other => other,
        }
    }
}

/// In-memory store
///
/// Names compare ASCII case-insensitively like registry value names. An
/// overwrite keeps the casing the entry was created with.
#[derive(Debug, Default)]
pub struct MemoryStore {
    location: String,
    /// Folded name -> (name as created, value)
    entries: RwLock<BTreeMap<String, (String, String)>>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl MemoryStore {
    /// Empty store
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store pre-filled with `entries`
    pub fn with_entries<N, V>(location: impl Into<String>, entries: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        let store = Self::new(location);
        for (name, value) in entries {
            store.insert(name.into(), value.into());
        }
        store
    }

    /// Copy of every entry, keyed by name as created
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().values().cloned().collect()
    }

    fn insert(&self, name: String, value: String) {
        self.entries
            .write()
            .entry(fold(&name))
            .and_modify(|entry| entry.1.clone_from(&value))
            .or_insert((name, value));
    }
}

impl CompatStore for MemoryStore {
    fn location(&self) -> &str {
        &self.location
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .read()
            .get(&fold(name))
            .map(|(_, value)| value.clone()))
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.entries
            .write()
            .remove(&fold(name))
            .map(|_| ())
            .ok_or_else(|| CompatError::EntryNotFound(name.to_string()))
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .values()
            .map(|(name, _)| name.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basics() {
        let store = MemoryStore::with_entries("test", [("C:\\a.exe", "~ WIN95")]);
        assert_eq!(store.get("C:\\a.exe").unwrap().as_deref(), Some("~ WIN95"));
        assert_eq!(store.get("C:\\b.exe").unwrap(), None);

        store.set("C:\\b.exe", "~ RUNASADMIN").unwrap();
        assert_eq!(store.names().unwrap(), vec!["C:\\a.exe", "C:\\b.exe"]);
    }

    #[test]
    fn test_names_ignore_case() {
        let store = MemoryStore::with_entries("test", [("C:\\Games\\Old.exe", "~ WIN95")]);
        assert_eq!(store.get("c:\\games\\old.EXE").unwrap().as_deref(), Some("~ WIN95"));

        store.set("C:\\GAMES\\OLD.EXE", "~ WIN98").unwrap();
        assert_eq!(store.names().unwrap(), vec!["C:\\Games\\Old.exe"]);
        assert_eq!(
            store.snapshot().get("C:\\Games\\Old.exe").map(String::as_str),
            Some("~ WIN98")
        );

        store.delete("c:\\games\\old.exe").unwrap();
        assert!(store.names().unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_entry() {
        let store = MemoryStore::new("test");
        assert!(matches!(
            store.delete("C:\\missing.exe"),
            Err(CompatError::EntryNotFound(_))
        ));
        assert!(store.delete_if_present("C:\\missing.exe").is_ok());
    }
}
