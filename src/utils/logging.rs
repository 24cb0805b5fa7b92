//! Logging setup
//!
//! Logs go to `app.log` in the data directory. The previous sessions are kept
//! as `app.log.1` (newest) through `app.log.9` (oldest).

use crate::error::{CompatError, Result, StringError};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Number of previous session logs kept next to `app.log`
const MAX_LOG_FILES: u8 = 9;

const LOG_FILE_NAME: &str = "app.log";

/// Install the global subscriber writing to `log_dir/app.log`
///
/// The level comes from `RUST_LOG` and defaults to `info`. The returned guard
/// flushes the background writer when dropped; keep it alive until exit.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    rotate_logs(&log_dir.join(LOG_FILE_NAME))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| CompatError::ConfigError(Box::new(e)))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = fmt()
        .with_writer(writer)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CompatError::ConfigError(Box::new(e)))?;

    tracing::info!("CompatManager v{} started", env!("CARGO_PKG_VERSION"));
    Ok(guard)
}

/// Shift `app.log` to `app.log.1`, `app.log.1` to `app.log.2` and so on,
/// dropping the oldest
fn rotate_logs(log_path: &Path) -> Result<()> {
    if log_path.file_name().is_none() {
        return Err(CompatError::ConfigError(StringError::new("Invalid log path")));
    }
    if !log_path.exists() {
        return Ok(());
    }

    let numbered = |n: u8| {
        let mut name = log_path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        std::path::PathBuf::from(name)
    };

    let oldest = numbered(MAX_LOG_FILES);
    if oldest.exists() {
        std::fs::remove_file(&oldest)?;
    }
    for n in (1..MAX_LOG_FILES).rev() {
        let from = numbered(n);
        if from.exists() {
            std::fs::rename(&from, numbered(n + 1))?;
        }
    }

    std::fs::rename(log_path, numbered(1))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_dir;
    use std::fs;

    #[test]
    fn test_rotation_keeps_history_in_order() {
        let dir = create_test_dir();
        let log_path = dir.path().join(LOG_FILE_NAME);

        for session in 1..=3 {
            fs::write(&log_path, format!("session {session}")).unwrap();
            rotate_logs(&log_path).unwrap();
        }

        assert!(!log_path.exists());
        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "session 3");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.3")).unwrap(), "session 1");
    }

    #[test]
    fn test_rotation_drops_oldest() {
        let dir = create_test_dir();
        let log_path = dir.path().join(LOG_FILE_NAME);

        for session in 1..=12 {
            fs::write(&log_path, format!("session {session}")).unwrap();
            rotate_logs(&log_path).unwrap();
        }

        assert!(!dir.path().join("app.log.10").exists());
        assert_eq!(fs::read_to_string(dir.path().join("app.log.9")).unwrap(), "session 4");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "session 12");
    }

    #[test]
    fn test_rotation_without_log_is_noop() {
        let dir = create_test_dir();
        rotate_logs(&dir.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
