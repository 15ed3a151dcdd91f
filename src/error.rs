//! Error types for the subsync CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for subsync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// `init.yaml` was not found at the resolved repository root.
    #[error("configuration not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    /// Invalid arguments or an invalid configuration document.
    #[error("{0}")]
    UserError(String),

    /// A required git invocation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),

    /// A filesystem operation failed.
    #[error("Filesystem operation failed: {0}")]
    FsError(String),

    /// Lock could not be acquired.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl SyncError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::ConfigMissing(_) => exit_codes::USER_ERROR,
            SyncError::UserError(_) => exit_codes::USER_ERROR,
            SyncError::GitError(_) => exit_codes::GIT_FAILURE,
            SyncError::FsError(_) => exit_codes::FS_FAILURE,
            SyncError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }

    /// Build an `FsError` from an io error and the path it concerns.
    pub fn fs(action: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        SyncError::FsError(format!("failed to {} '{}': {}", action, path.display(), err))
    }
}

/// Result type alias for subsync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
