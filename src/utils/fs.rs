//! File system helpers

use std::path::{Path, PathBuf};
use tracing::debug;

/// Find every `*.exe` below `root`, recursively
///
/// Directories that cannot be read are skipped. The extension match ignores
/// case. Results are sorted.
pub fn find_executables(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping {}: {}", dir.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_executable(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}

fn is_executable(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}
