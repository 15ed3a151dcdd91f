//! Exit code constants for the subsync CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, missing or invalid `init.yaml`)
//! - 3: Git operation failure
//! - 4: Lock acquisition failure
//! - 5: Filesystem failure
//!
//! Per-entry failures never reach the exit code; they are only logged.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, missing or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Git operation failure that aborted a whole command.
pub const GIT_FAILURE: i32 = 3;

/// Another reconcile run holds the lock.
pub const LOCK_FAILURE: i32 = 4;

/// Filesystem failure that aborted a whole command (e.g. backup).
pub const FS_FAILURE: i32 = 5;
