//! CLI argument parsing for subsync.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Subsync: keep nested repositories, symlinked sources and projected copy
/// trees in line with `init.yaml`.
#[derive(Parser, Debug)]
#[command(name = "subsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use this directory as the repository root instead of searching upward
    /// for `init.yaml`.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for subsync.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy every configured source into a target directory.
    ///
    /// Applies ignore patterns, replaces listed items with symlinks back to
    /// the source, normalizes line endings and snapshots the previous
    /// target into the backup folder first.
    #[command(visible_alias = "copy")]
    Project(ProjectArgs),

    /// Bind nested repositories and links, merge ignore files, then commit
    /// and push the host repository.
    #[command(visible_alias = "init")]
    Reconcile,
}

/// Arguments for the `project` command.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Directory to project into (relative paths resolve against the root).
    #[arg(short, long, value_name = "DIR")]
    pub target: PathBuf,

    /// Skip the timestamped backup of the current target.
    #[arg(long)]
    pub no_backup: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
