//! Timestamped snapshots of a projection target.

use crate::error::{Result, SyncError};
use crate::fs::{copy_dir_all, ensure_dir};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot directory name format (`YYYYMMDD_HHMMSS`).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Copy `target_root` into `backup_folder/<timestamp>`.
///
/// Returns `None` without touching anything when the target is missing or
/// empty. A snapshot name that already exists (two runs in one second) is
/// merged into.
pub fn snapshot(
    target_root: &Path,
    backup_folder: &Path,
    started_at: DateTime<Local>,
) -> Result<Option<PathBuf>> {
    if !has_content(target_root)? {
        return Ok(None);
    }

    let dest = backup_folder.join(started_at.format(TIMESTAMP_FORMAT).to_string());
    ensure_dir(&dest)?;

    // Earlier snapshots are skipped when the backup folder lives in the target.
    let files = copy_dir_all(target_root, &dest, Some(backup_folder))?;
    tracing::info!(
        "backed up {} file(s) from '{}' to '{}'",
        files,
        target_root.display(),
        dest.display()
    );

    Ok(Some(dest))
}

fn has_content(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(dir).map_err(|e| SyncError::fs("read directory", dir, e))?;
    Ok(entries.next().is_some())
}
