//! `CompatManager` - Bulk editor for Windows compatibility layers
//!
//! Windows stores per-application compatibility settings ("run in Windows XP
//! mode", "run as administrator", DPI overrides) as space-delimited strings
//! under `AppCompatFlags\Layers`. This crate decodes those strings into typed
//! settings, lets many applications be edited at once through an aggregated
//! view, and writes the result back.
//!
//! # Layout
//!
//! - [`flags`]: token vocabulary
//! - [`codec`]: layer string decode and encode
//! - [`settings`]: editable records, check states, multi-selection aggregate
//! - [`registry`]: store abstraction over the layers keys
//! - [`session`]: application lists, selection, reload and save
//! - [`platform`]: OS version, elevation, environment broadcast
//! - [`config`]: persisted preferences

pub mod codec;
pub mod config;
pub mod error;
pub mod flags;
pub mod platform;
pub mod registry;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use error::{CompatError, Result};
