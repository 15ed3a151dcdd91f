//! Filesystem utilities for subsync.
//!
//! Atomic rewrites for ignore files, metadata-preserving copies for the
//! projector and backups, and a portable symlink helper.

pub mod atomic;
mod copy;
mod link;

pub use atomic::atomic_write_file;
pub use copy::{copy_dir_all, copy_preserving, ensure_dir, ensure_distinct};
pub use link::{create_symlink, is_symlink_to, remove_existing};
