//! Configuration model for subsync.
//!
//! This module defines the `Config` struct that represents `init.yaml` at the
//! repository root: the `init` block with host repository settings and the
//! ordered `subdir` list of sources. Unknown keys are ignored for forward
//! compatibility.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::{Config, InitSettings, SubdirEntry};
pub use types::{EntryKind, LineEnding};

/// File name of the configuration document.
pub const CONFIG_FILE_NAME: &str = "init.yaml";
