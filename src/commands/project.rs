//! Implementation of the `subsync project` command.

use crate::cli::ProjectArgs;
use crate::context::RepoContext;
use crate::error::Result;
use crate::project::{ProjectOptions, ProjectionReport, project_all};
use chrono::Local;
use std::path::Path;

/// Execute the `subsync project` command.
pub fn cmd_project(root: Option<&Path>, args: ProjectArgs) -> Result<()> {
    let ctx = RepoContext::resolve(root)?;
    let config = ctx.load_config()?;

    let options = ProjectOptions {
        target_root: ctx.resolve_against_root(&args.target),
        backup: !args.no_backup,
        started_at: Local::now(),
    };
    let report = project_all(&ctx, &config, &options)?;

    print_summary(&options.target_root, &report);
    Ok(())
}

fn print_summary(target: &Path, report: &ProjectionReport) {
    if let Some(backup) = &report.backup {
        println!("Backup: {}", backup.display());
    }
    println!("Projected into {}", target.display());
    println!("  Entries:  {:>4}", report.entries_projected);
    println!("  Skipped:  {:>4}", report.entries_skipped);
    println!("  Failed:   {:>4}", report.entries_failed);
    println!("  Files:    {:>4}", report.files_copied);
    println!("  Symlinks: {:>4}", report.symlinks_created);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let args = ProjectArgs {
            target: "out".into(),
            no_backup: true,
        };

        let err = cmd_project(Some(temp.path()), args).unwrap_err();

        assert!(matches!(err, SyncError::ConfigMissing(_)));
        assert_eq!(err.exit_code(), 1);
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_relative_target_resolves_against_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/app")).unwrap();
        fs::write(temp.path().join("src/app/main.txt"), "hi\n").unwrap();
        fs::write(
            temp.path().join("init.yaml"),
            "subdir:\n  - path: src/app\n",
        )
        .unwrap();
        let args = ProjectArgs {
            target: "out".into(),
            no_backup: false,
        };

        cmd_project(Some(temp.path()), args).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("out/app/main.txt")).unwrap(),
            "hi\n"
        );
    }
}
