//! Implementation of the `subsync reconcile` command.

use crate::context::RepoContext;
use crate::error::Result;
use crate::git::SystemGit;
use crate::locks;
use crate::reconcile::{ReconcileReport, reconcile_all};
use std::path::Path;

/// Execute the `subsync reconcile` command.
///
/// Holds the run lock for the whole reconcile so two runs never interleave
/// git operations on the same host.
pub fn cmd_reconcile(root: Option<&Path>) -> Result<()> {
    let ctx = RepoContext::resolve(root)?;
    let config = ctx.load_config()?;

    let _guard = locks::acquire_run_lock(&ctx, "reconcile")?;
    let report = reconcile_all(&ctx, &config, &SystemGit::new())?;

    print_summary(&ctx.repo_root, &report);
    Ok(())
}

fn print_summary(root: &Path, report: &ReconcileReport) {
    println!("Reconciled {}", root.display());
    println!("  Entries:  {:>4}", report.entries_reconciled);
    println!("  Skipped:  {:>4}", report.entries_skipped);
    println!("  Failed:   {:>4}", report.entries_failed);
    if report.committed {
        println!("Committed host changes.");
    }
    if report.pushed {
        println!("Pushed host branch.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_fails_before_touching_git() {
        let temp = TempDir::new().unwrap();

        let err = cmd_reconcile(Some(temp.path())).unwrap_err();

        assert!(matches!(err, SyncError::ConfigMissing(_)));
        assert!(!temp.path().join(".git").exists());
        assert!(!temp.path().join(".subsync.lock").exists());
    }

    #[test]
    fn test_held_lock_blocks_second_run() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("init.yaml"), "subdir: []\n").unwrap();
        let ctx = RepoContext::at(temp.path());
        let _held = locks::acquire_run_lock(&ctx, "reconcile").unwrap();

        let err = cmd_reconcile(Some(temp.path())).unwrap_err();

        assert!(matches!(err, SyncError::LockError(_)));
        assert_eq!(err.exit_code(), 4);
        assert!(!temp.path().join(".git").exists());
    }
}
