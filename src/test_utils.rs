#![expect(
    clippy::unwrap_used,
    reason = "Test utilities use .unwrap() for brevity"
)]

//! Shared helpers for unit tests

use crate::error::{CompatError, Result, StringError};
use crate::registry::{CompatStore, MemoryStore};
use parking_lot::{Mutex, MutexGuard};
use tempfile::TempDir;

/// Serializes tests that point APPDATA somewhere else
static APPDATA_LOCK: Mutex<()> = Mutex::new(());

/// Temporary directory removed on drop
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Points APPDATA at a temporary directory until dropped
///
/// Holds a process-wide lock for its whole lifetime, so no two tests change
/// or read APPDATA through this guard at the same time.
pub struct AppdataGuard {
    original: Option<String>,
    _lock: MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only environment change serialized by APPDATA_LOCK"
)]
impl AppdataGuard {
    /// Set APPDATA to `temp_dir`
    pub fn new(temp_dir: &TempDir) -> Self {
        let lock = APPDATA_LOCK.lock();
        let original = std::env::var("APPDATA").ok();
        // SAFETY: APPDATA_LOCK is held, so no other guarded test touches the variable.
        unsafe {
            std::env::set_var("APPDATA", temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only environment restore serialized by APPDATA_LOCK"
)]
impl Drop for AppdataGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is still held until this guard's fields drop.
        unsafe {
            match &self.original {
                Some(original) => std::env::set_var("APPDATA", original),
                None => std::env::remove_var("APPDATA"),
            }
        }
    }
}

/// Store whose writes fail for one entry name
#[derive(Debug)]
pub struct FailingStore {
    inner: MemoryStore,
    failing: String,
}

impl FailingStore {
    /// Wrap `inner`, failing every write and delete of `failing`
    pub fn new(inner: MemoryStore, failing: impl Into<String>) -> Self {
        Self {
            inner,
            failing: failing.into(),
        }
    }

    fn check(&self, name: &str) -> Result<()> {
        if name == self.failing {
            Err(CompatError::StoreAccessFailed(StringError::new("access denied")))
        } else {
            Ok(())
        }
    }
}

impl CompatStore for FailingStore {
    fn location(&self) -> &str {
        self.inner.location()
    }

    fn get(&self, name: &str) -> Result<Option<String>> {
        self.inner.get(name)
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.check(name)?;
        self.inner.set(name, value)
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.check(name)?;
        self.inner.delete(name)
    }

    fn names(&self) -> Result<Vec<String>> {
        self.inner.names()
    }
}
