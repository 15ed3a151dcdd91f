//! RAII lock guard implementation.

use std::fs;
use std::path::{Path, PathBuf};

/// Removes the lock file when dropped.
///
/// A failed removal is logged, never a panic.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    pub(super) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("failed to release lock '{}': {}", self.path.display(), e);
        }
    }
}
