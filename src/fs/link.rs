//! Symlink helpers.

use crate::error::{Result, SyncError};
use std::fs;
use std::path::Path;

/// Create a symbolic link at `link` pointing to `target`.
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| {
        SyncError::FsError(format!(
            "failed to create symlink '{}' -> '{}': {}",
            link.display(),
            target.display(),
            e
        ))
    })
}

/// Create a symbolic link at `link` pointing to `target`.
///
/// Windows distinguishes file and directory links; the kind follows the target.
#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    let resolved = match link.parent() {
        Some(parent) if target.is_relative() => parent.join(target),
        _ => target.to_path_buf(),
    };
    let result = if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    result.map_err(|e| {
        SyncError::FsError(format!(
            "failed to create symlink '{}' -> '{}': {}",
            link.display(),
            target.display(),
            e
        ))
    })
}

/// Remove whatever sits at `path`: file, symlink or directory tree.
///
/// Missing paths are not an error.
pub fn remove_existing(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(SyncError::fs("inspect", path, e)),
    };

    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| SyncError::fs("remove", path, e))
}

/// True if `link` is a symlink whose resolved location equals `target`'s.
pub fn is_symlink_to(link: &Path, target: &Path) -> bool {
    let is_link = fs::symlink_metadata(link)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return false;
    }

    match (fs::canonicalize(link), fs::canonicalize(target)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
