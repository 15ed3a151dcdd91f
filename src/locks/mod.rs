//! Run lock for the reconciler.
//!
//! Two reconcile runs against the same host repository would interleave index
//! mutations, so a run holds `.git/subsync.lock` (or `.subsync.lock` at the
//! root before `git init`) for its whole duration. The file is created with
//! **create_new** semantics; a second run fails fast with `LockError`.
//!
//! The lock file holds JSON metadata (`owner`, `pid`, `created_at`, `action`)
//! so the losing run can say who holds it. The guard removes the file on drop.

mod guard;
mod metadata;
mod operations;


pub use guard::LockGuard;
pub use metadata::LockMetadata;
pub use operations::acquire_run_lock;
