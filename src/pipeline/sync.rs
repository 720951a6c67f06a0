//! Directory synchronisation for the output tree.
//!
//! Blocking filesystem calls; the build driver runs them on the blocking
//! pool.

use crate::error::JournalError;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Create `path` and any missing ancestors. Succeeds if it already exists.
pub fn ensure_directory(path: &Path) -> Result<(), JournalError> {
    fs::create_dir_all(path).map_err(|e| JournalError::DirectoryCreateFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Mirror every file and directory under `source` into `target`.
///
/// Destination files that already exist are never replaced, so edits made
/// to previously copied assets survive. Returns the number of files copied.
pub fn copy_files(source: &Path, target: &Path) -> Result<usize, JournalError> {
    ensure_directory(target)?;
    let mut copied = 0;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| JournalError::CopyFailed {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
            reason: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| JournalError::Internal(format!("walkdir escaped its root: {e}")))?;
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            ensure_directory(&dest)?;
        } else if !dest.exists() {
            fs::copy(entry.path(), &dest).map_err(|e| JournalError::CopyFailed {
                from: entry.path().to_path_buf(),
                to: dest.clone(),
                reason: e.to_string(),
            })?;
            debug!("Copied {} → {}", entry.path().display(), dest.display());
            copied += 1;
        }
    }
    Ok(copied)
}
