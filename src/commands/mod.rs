//! Command implementations for subsync.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod project;
mod reconcile;

use crate::cli::{Cli, Command};
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let root = cli.root.as_deref();
    match cli.command {
        Command::Project(args) => project::cmd_project(root, args),
        Command::Reconcile => reconcile::cmd_reconcile(root),
    }
}
