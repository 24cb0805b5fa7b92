//! Notifications published by a session

use crate::registry::Hive;
use serde::Serialize;

/// An entry whose store operation failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    /// Hive of the list the application belongs to
    pub hive: Hive,
    /// Application path
    pub path: String,
    /// What went wrong
    pub message: String,
}

/// Outcome of saving the selected applications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// Paths whose layer string was written
    pub written: Vec<String>,
    /// Paths whose layer string was removed
    pub deleted: Vec<String>,
    /// Paths that could not be saved; their edits are kept
    pub failed: Vec<EntryFailure>,
}

impl SaveReport {
    /// Whether every entry was saved
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of reloading the selected applications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReloadReport {
    /// Number of applications reloaded
    pub reloaded: usize,
    /// Paths that could not be read; their settings are unchanged
    pub failed: Vec<EntryFailure>,
}

/// Session state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The set of selected applications changed
    SelectionChanged,
    /// The displayed settings were edited
    SettingsChanged,
    /// A bulk operation started (`true`) or finished (`false`)
    Busy(bool),
    /// A save finished
    Saved(SaveReport),
    /// A reload finished
    Reloaded(ReloadReport),
}
