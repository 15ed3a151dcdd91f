//! Linkage reconciliation for subsync.
//!
//! Brings the host repository in line with `init.yaml`: nested repositories
//! are bound as submodules on their configured branch, symbolic link entries
//! are created, ignore files are merged, and the result is committed and
//! pushed. Each entry is isolated; a failure is reported and the run moves
//! on to the next entry.

mod gitignore;
mod host;
mod nested;
pub mod state;
mod symlink;


pub use state::BindingState;

use crate::config::{Config, EntryKind, InitSettings};
use crate::context::RepoContext;
use crate::error::Result;
use crate::git::Vcs;
use std::path::Path;
use symlink::LinkOutcome;
use tracing::{error, info, warn};

/// Summary of one reconcile run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The host remote was (re)configured from `init.git-url`.
    pub remote_configured: bool,
    /// The bootstrap commit was created.
    pub bootstrapped: bool,
    pub entries_reconciled: usize,
    pub entries_skipped: usize,
    pub entries_failed: usize,
    pub committed: bool,
    pub pushed: bool,
}

/// Shared state for one run.
pub(crate) struct Reconciler<'a> {
    pub ctx: &'a RepoContext,
    pub settings: &'a InitSettings,
    pub vcs: &'a dyn Vcs,
}

impl Reconciler<'_> {
    pub fn root(&self) -> &Path {
        &self.ctx.repo_root
    }
}

/// Reconcile every entry in `config` against the host at `ctx.repo_root`.
///
/// # Returns
///
/// * `Ok(ReconcileReport)` - Run completed; individual entries may have failed
/// * `Err(SyncError)` - The host could not be initialized or bootstrapped
pub fn reconcile_all(
    ctx: &RepoContext,
    config: &Config,
    vcs: &dyn Vcs,
) -> Result<ReconcileReport> {
    let r = Reconciler {
        ctx,
        settings: &config.init,
        vcs,
    };
    let mut report = ReconcileReport::default();

    match host::setup_remote(&r) {
        Ok(configured) => report.remote_configured = configured,
        Err(e) => error!("host remote setup failed: {}", e),
    }

    report.bootstrapped = host::ensure_initial_commit(&r)?;

    for entry in &config.subdir {
        let name = entry.display_name();
        if name.is_empty() {
            warn!("skipping entry with empty name (path '{}')", entry.path);
            report.entries_skipped += 1;
            continue;
        }

        let Some(kind) = entry.kind() else {
            warn!("skipping {}: unknown type '{}'", name, entry.type_label());
            report.entries_skipped += 1;
            continue;
        };

        info!("reconciling {} ({})", name, kind);
        let outcome = match kind {
            EntryKind::NestedRepo => nested::reconcile(&r, entry).map(|()| true),
            EntryKind::SymbolicLink => {
                symlink::reconcile(&r, entry).map(|o| o != LinkOutcome::Conflict)
            }
        };

        match outcome {
            Ok(true) => report.entries_reconciled += 1,
            Ok(false) => report.entries_skipped += 1,
            Err(e) => {
                error!("failed to reconcile {}: {}", name, e);
                report.entries_failed += 1;
            }
        }
    }

    let finalized = host::finalize(&r)?;
    report.committed = finalized.committed;
    report.pushed = finalized.pushed;

    info!(
        reconciled = report.entries_reconciled,
        skipped = report.entries_skipped,
        failed = report.entries_failed,
        "reconcile finished"
    );
    Ok(report)
}
