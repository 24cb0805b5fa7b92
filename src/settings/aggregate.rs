//! Multi-selection editing
//!
//! An [`AggregatedSettings`] owns handles to the records of every selected
//! application and a merged, read-only view of them. Every edit goes to all
//! members first, then the view is rebuilt from the members, so the view can
//! never drift from what will be saved.

use super::{SettingsEdit, SettingsRecord};
use crate::config::LastUsedValues;
use crate::error::Result;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::debug;

/// A settings record shared between an application list and any aggregate
pub type SharedSettings = Arc<Mutex<SettingsRecord>>;

/// Wrap a record for sharing
pub fn shared(record: SettingsRecord) -> SharedSettings {
    Arc::new(Mutex::new(record))
}

/// Lock every record, returning the guards in input order
///
/// Locks are taken in address order so that two threads locking overlapping
/// sets cannot deadlock. The records must be distinct.
pub fn lock_all(records: &[SharedSettings]) -> Vec<MutexGuard<'_, SettingsRecord>> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&i| Arc::as_ptr(&records[i]).addr());

    let mut guards: Vec<Option<MutexGuard<'_, SettingsRecord>>> =
        std::iter::repeat_with(|| None).take(records.len()).collect();
    for i in order {
        guards[i] = Some(records[i].lock());
    }
    guards.into_iter().flatten().collect()
}

/// Settings of several applications edited as one
#[derive(Debug)]
pub struct AggregatedSettings {
    members: Vec<SharedSettings>,
    view: SettingsRecord,
}

impl AggregatedSettings {
    /// Aggregate the given records; duplicates are dropped, `None` if nothing is left
    pub fn new(members: Vec<SharedSettings>) -> Option<Self> {
        let mut unique: Vec<SharedSettings> = Vec::with_capacity(members.len());
        for member in members {
            if !unique.iter().any(|known| Arc::ptr_eq(known, &member)) {
                unique.push(member);
            }
        }
        if unique.is_empty() {
            return None;
        }

        let mut aggregate = Self {
            members: unique,
            view: SettingsRecord::default(),
        };
        aggregate.refresh();
        Some(aggregate)
    }

    /// Member records
    pub fn members(&self) -> &[SharedSettings] {
        &self.members
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; an aggregate has at least one member
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Merged view of the members
    pub fn view(&self) -> &SettingsRecord {
        &self.view
    }

    /// Rebuild the view after members were changed from elsewhere (reload, save)
    pub fn refresh(&mut self) {
        let guards = lock_all(&self.members);
        self.view = merge_guards(&guards);
    }

    /// Apply an edit to every member, then rebuild the view
    ///
    /// The edit is validated up front so that it is applied to all members or
    /// to none of them. Ticking an enum category whose members hold different
    /// values first sets every member to the last used value, so the members
    /// agree and the tick sticks.
    pub fn apply(&mut self, edit: &SettingsEdit, last_used: &LastUsedValues) -> Result<()> {
        edit.validate()?;

        let mut guards = lock_all(&self.members);
        let fallback = {
            let records: Vec<&SettingsRecord> = guards.iter().map(|guard| &**guard).collect();
            SettingsRecord::tick_fallback(&records, edit, last_used)
        };
        for guard in &mut guards {
            if let Some(value) = &fallback {
                guard.apply(value, last_used)?;
            }
            guard.apply(edit, last_used)?;
        }
        self.view = merge_guards(&guards);
        debug!("Applied {:?} to {} records", edit, guards.len());
        Ok(())
    }

    /// Clear every member
    pub fn clear(&mut self, last_used: &LastUsedValues) -> Result<()> {
        self.apply(&SettingsEdit::Clear, last_used)
    }
}

fn merge_guards(guards: &[MutexGuard<'_, SettingsRecord>]) -> SettingsRecord {
    let records: Vec<&SettingsRecord> = guards.iter().map(|guard| &**guard).collect();
    SettingsRecord::merged(&records)
}

/// Merged view of several records, without keeping an aggregate around
pub fn aggregate(records: &[SharedSettings]) -> SettingsRecord {
    let guards = lock_all(records);
    merge_guards(&guards)
}
