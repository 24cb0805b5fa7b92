//! Error types for `CompatManager`
//!
//! This module defines all error types used throughout the application,
//! providing clear error messages and proper error propagation.
//!
//! Decoding a layer string never fails: unknown words become additional
//! flags. Errors only come from the registry, the file system, the platform,
//! or from user input that would not survive a round trip.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for `CompatManager`
#[derive(Debug, Error)]
pub enum CompatError {
    /// A layers key could not be opened (usually insufficient privileges)
    #[error("Registry key unavailable: {0}")]
    StoreUnavailable(String),

    /// The named value does not exist in the store
    #[error("Registry value not found: {0}")]
    EntryNotFound(String),

    /// Reading, writing or deleting a registry value failed
    /// Preserves the underlying error source for full error chain transparency
    #[error("Registry access failed: {0}")]
    StoreAccessFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An additional flag collides with a known token
    #[error("'{0}' is a reserved compatibility flag, use the matching setting instead")]
    ReservedToken(String),

    /// An additional flag is not a single word
    #[error("Additional flag must be a single word: '{0}'")]
    InvalidAdditionalFlag(String),

    /// The operation needs exactly one selected application
    #[error("This operation requires exactly one selected application")]
    NotSingleSelection,

    /// Unknown Windows release
    #[error("Unsupported Windows version {major}.{minor}")]
    UnsupportedOsVersion {
        /// NT major version
        major: u32,
        /// NT minor version
        minor: u32,
    },

    /// Not running on Windows
    #[error("AppCompatFlags layers only exist on Windows")]
    UnsupportedPlatform,

    /// Relaunching through UAC failed for a reason other than the user declining
    #[error("Failed to elevate: {0}")]
    ElevationFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Windows API error
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApiError(#[from] windows::core::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for `CompatManager` operations
pub type Result<T> = std::result::Result<T, CompatError>;

/// Convert an error to a user-friendly message
///
/// This function takes a `CompatError` and returns a message suitable
/// for displaying to end users in error dialogs.
pub fn get_user_friendly_error(error: &CompatError) -> String {
    match error {
        CompatError::StoreUnavailable(key) => format!(
            "Unable to open the registry key:\n{key}\n\n\
             Machine-wide settings require administrator rights.\n\
             Restart the application as administrator to edit them."
        ),
        CompatError::EntryNotFound(name) => {
            format!("No compatibility settings are stored for:\n{name}")
        }
        CompatError::StoreAccessFailed(e) => format!(
            "Failed to access the registry:\n\n{e}\n\n\
             Please check that you have permission to modify compatibility settings."
        ),
        CompatError::ReservedToken(token) => format!(
            "'{token}' is already handled by the settings above.\n\n\
             Use the matching option instead of an additional flag."
        ),
        CompatError::InvalidAdditionalFlag(flag) => format!(
            "'{flag}' contains spaces.\n\n\
             Add each additional flag as a separate entry."
        ),
        CompatError::NotSingleSelection => "Select a single application to edit its \
             additional flags."
            .to_string(),
        CompatError::UnsupportedOsVersion { major, minor } => format!(
            "Windows version {major}.{minor} is not supported.\n\n\
             Compatibility layers require Windows 2000 or later."
        ),
        CompatError::UnsupportedPlatform => {
            "Compatibility layers can only be edited on Windows.".to_string()
        }
        CompatError::ElevationFailed(e) => format!(
            "Unable to restart as administrator:\n\n{e}"
        ),
        CompatError::ConfigError(_) => "Failed to load or save preferences.\n\n\
             Your last used settings may not persist.\n\
             Check that you have write permissions to:\n\
             %APPDATA%\\CompatManager"
            .to_string(),
        #[cfg(windows)]
        CompatError::WindowsApiError(e) => {
            format!(
                "A Windows API error occurred:\n\n{e}\n\n\
                 Please ensure your Windows installation is up to date."
            )
        }
        CompatError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        CompatError::JsonError(e) => {
            format!(
                "Preferences file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CompatError::ReservedToken("RUNASADMIN".to_string());
        assert_eq!(
            error.to_string(),
            "'RUNASADMIN' is a reserved compatibility flag, use the matching setting instead"
        );
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = CompatError::StoreUnavailable("HKLM\\Layers".to_string());
        let message = get_user_friendly_error(&error);
        assert!(message.contains("administrator"));
        assert!(message.contains("HKLM\\Layers"));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CompatError = io_error.into();
        assert!(matches!(error, CompatError::IoError(_)));
    }

    #[test]
    fn test_store_access_preserves_source() {
        use std::error::Error as _;

        let error = CompatError::StoreAccessFailed(StringError::new("access denied"));
        assert_eq!(error.to_string(), "Registry access failed: access denied");
        assert!(error.source().is_some());
    }

    #[test]
    fn test_unsupported_version_display() {
        let error = CompatError::UnsupportedOsVersion { major: 4, minor: 0 };
        assert_eq!(error.to_string(), "Unsupported Windows version 4.0");
        assert!(get_user_friendly_error(&error).contains("4.0"));
    }
}
