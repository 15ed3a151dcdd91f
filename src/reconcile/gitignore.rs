//! Append-only merges into ignore files.

use crate::error::{Result, SyncError};
use crate::fs::atomic_write_file;
use std::fs;
use std::path::Path;

/// Trim and strip a leading `./` (plus any slashes after it) for comparison.
pub fn normalize_entry(entry: &str) -> String {
    let s = entry.trim();
    match s.strip_prefix("./") {
        Some(rest) => rest.trim_start_matches('/').to_string(),
        None => s.to_string(),
    }
}

/// Append `entry` to `gitignore` unless an equivalent line is present.
///
/// Returns true if the file changed.
pub fn merge_entry(gitignore: &Path, entry: &str) -> Result<bool> {
    let normalized = normalize_entry(entry);
    if normalized.is_empty() {
        return Ok(false);
    }

    if !gitignore.exists() {
        atomic_write_file(gitignore, &format!("{}\n", normalized))?;
        return Ok(true);
    }

    let mut content =
        fs::read_to_string(gitignore).map_err(|e| SyncError::fs("read", gitignore, e))?;
    if content.lines().any(|line| normalize_entry(line) == normalized) {
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&normalized);
    content.push('\n');
    atomic_write_file(gitignore, &content)?;
    Ok(true)
}

/// Merge several entries; returns how many were appended.
pub fn merge_entries<I, S>(gitignore: &Path, entries: I) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut added = 0;
    for entry in entries {
        if merge_entry(gitignore, entry.as_ref())? {
            added += 1;
        }
    }
    Ok(added)
}
