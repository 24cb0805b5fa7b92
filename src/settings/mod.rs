//! Editable compatibility settings
//!
//! A [`SettingsRecord`] holds the settings of one application together with
//! a checkbox per category. [`AggregatedSettings`] edits several records at
//! once through a merged view.

mod aggregate;
mod check_state;
mod record;

pub use aggregate::{AggregatedSettings, SharedSettings, aggregate, lock_all, shared};
pub use check_state::CheckState;
pub use record::{Category, SettingsEdit, SettingsRecord};
