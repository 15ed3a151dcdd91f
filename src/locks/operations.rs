//! Lock acquisition.

use super::guard::LockGuard;
use super::metadata::LockMetadata;
use crate::context::RepoContext;
use crate::error::{Result, SyncError};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Create `lock_path` exclusively and write `metadata` into it.
fn acquire_lock(lock_path: &Path, metadata: &LockMetadata) -> Result<LockGuard> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                let holder = match LockMetadata::from_file(lock_path) {
                    Ok(meta) => format!(
                        "\nLock: {} (created {} ago by {}, pid {})\nAction: {}",
                        lock_path.display(),
                        meta.age_string(),
                        meta.owner,
                        meta.pid.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string()),
                        meta.action
                    ),
                    Err(_) => format!("\nLock: {}", lock_path.display()),
                };
                SyncError::LockError(format!(
                    "another subsync run holds the lock{}\n\n\
                     If no other run is active, delete the lock file and retry.",
                    holder
                ))
            } else {
                SyncError::LockError(format!(
                    "failed to acquire lock '{}': {}",
                    lock_path.display(),
                    e
                ))
            }
        })?;

    let json = metadata.to_json()?;
    if let Err(e) = file.write_all(json.as_bytes()).and_then(|_| file.sync_all()) {
        let _ = fs::remove_file(lock_path);
        return Err(SyncError::LockError(format!(
            "failed to write lock metadata: {}",
            e
        )));
    }

    Ok(LockGuard::new(lock_path.to_path_buf()))
}

/// Acquire the run lock for `action` (e.g. "reconcile").
///
/// # Returns
///
/// * `Ok(LockGuard)` - Lock held until the guard drops
/// * `Err(SyncError::LockError)` - Another run holds it (exit code 4)
pub fn acquire_run_lock(ctx: &RepoContext, action: &str) -> Result<LockGuard> {
    let metadata = LockMetadata::new(action);
    acquire_lock(&ctx.lock_path(), &metadata)
}
