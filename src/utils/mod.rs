//! Utility modules
//!
//! Logging setup and executable discovery.

pub mod fs;
pub mod logging;

pub use fs::find_executables;
pub use logging::init_logging;
