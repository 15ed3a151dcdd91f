//! Nested repository (submodule) entries.

use super::Reconciler;
use super::gitignore;
use super::state::{BindOutcome, BindStep, BindingState};
use crate::config::SubdirEntry;
use crate::error::{Result, SyncError};
use crate::fs::{ensure_dir, remove_existing};
use crate::git::{CallPolicy, has_staged_changes, probe, ref_exists, run_git_with};
use std::path::Path;
use tracing::{debug, info, warn};

pub(super) const NESTED_IGNORE_COMMIT_MESSAGE: &str = "chore: update gitignore";

/// Bind the entry, put it on its branch, merge its ignore patterns and stage it in the host.
pub(super) fn reconcile(r: &Reconciler<'_>, entry: &SubdirEntry) -> Result<()> {
    let name = entry.display_name();
    let rel = entry.relative_path();
    let path = entry.resolve(r.root());
    let url = entry
        .url()
        .ok_or_else(|| SyncError::UserError(format!("submodule '{}' has no url", name)))?;
    let branch = entry.branch();

    bind(r, &name, &rel, &path, url, branch)?;
    resolve_branch(r, &path, branch)?;
    merge_ignore(r, entry, &path)?;

    run_git_with(r.vcs, r.root(), &["add", &rel], CallPolicy::BestEffort)?;
    if r.ctx.gitmodules_path().exists() {
        run_git_with(r.vcs, r.root(), &["add", ".gitmodules"], CallPolicy::BestEffort)?;
    }
    Ok(())
}

/// Drive the binding state machine until the path holds a repository.
fn bind(
    r: &Reconciler<'_>,
    name: &str,
    rel: &str,
    path: &Path,
    url: &str,
    branch: &str,
) -> Result<()> {
    let mut state = BindingState::observe(r.ctx, rel);
    debug!(entry = name, ?state, "observed binding state");

    loop {
        let output = match state.step() {
            BindStep::ResolveBranch => return Ok(()),
            BindStep::BindWithBranch => {
                info!("adding submodule {} from {} (branch {})", name, url, branch);
                if let Some(parent) = path.parent() {
                    ensure_dir(parent)?;
                }
                probe(r.vcs, r.root(), &["submodule", "add", "-f", "-b", branch, url, rel])?
            }
            BindStep::RecoverAndBind => {
                teardown(r, rel, path)?;
                info!("re-adding submodule {} from {}", name, url);
                probe(r.vcs, r.root(), &["submodule", "add", "-f", url, rel])?
            }
        };

        if !output.success() {
            info!("submodule add for {} failed: {}", name, output.message());
        }
        state = state
            .transition(BindOutcome::from(output.success()))
            .ok_or_else(|| {
                SyncError::GitError(format!(
                    "failed to add submodule '{}' from {}: {}",
                    name,
                    url,
                    output.message()
                ))
            })?;
    }
}

/// Remove every trace of a half-registered submodule.
fn teardown(r: &Reconciler<'_>, rel: &str, path: &Path) -> Result<()> {
    warn!("removing leftovers of submodule {}", rel);
    let root = r.root();
    let section = format!("submodule.{}", rel);

    let steps: [&[&str]; 3] = [
        &["submodule", "deinit", "-f", rel],
        &["rm", "-f", rel],
        &["config", "--remove-section", &section],
    ];
    for args in steps {
        let output = probe(r.vcs, root, args)?;
        if !output.success() {
            debug!("git {}: {}", args.join(" "), output.message());
        }
    }

    if r.ctx.gitmodules_path().exists() {
        probe(
            r.vcs,
            root,
            &["config", "-f", ".gitmodules", "--remove-section", &section],
        )?;
    }

    remove_existing(path)?;
    remove_existing(&r.ctx.module_metadata_dir(rel))?;
    Ok(())
}

/// Check out `branch` tracking origin, creating and publishing it when origin lacks it.
fn resolve_branch(r: &Reconciler<'_>, path: &Path, branch: &str) -> Result<()> {
    run_git_with(r.vcs, path, &["fetch", "origin"], CallPolicy::BestEffort)?;

    let upstream = format!("origin/{}", branch);
    if ref_exists(r.vcs, path, &format!("refs/remotes/{}", upstream))? {
        run_git_with(
            r.vcs,
            path,
            &["checkout", "-B", branch, &upstream],
            CallPolicy::Required,
        )?;
    } else {
        info!("branch {} not found on origin; creating it", branch);
        run_git_with(r.vcs, path, &["checkout", "-B", branch], CallPolicy::Required)?;
        run_git_with(
            r.vcs,
            path,
            &["push", "-u", "origin", branch],
            CallPolicy::BestEffort,
        )?;
    }
    Ok(())
}

/// Merge the entry's ignore patterns into the nested `.gitignore` and publish them.
fn merge_ignore(r: &Reconciler<'_>, entry: &SubdirEntry, path: &Path) -> Result<()> {
    let gitignore_path = path.join(".gitignore");
    let added = gitignore::merge_entries(&gitignore_path, &entry.ignore)?;
    if added > 0 {
        debug!("added {} pattern(s) to {}", added, gitignore_path.display());
    }
    if !gitignore_path.exists() {
        return Ok(());
    }

    run_git_with(r.vcs, path, &["add", ".gitignore"], CallPolicy::BestEffort)?;
    if !has_staged_changes(r.vcs, path)? {
        return Ok(());
    }

    info!("committing .gitignore in {}", entry.display_name());
    let commit = run_git_with(
        r.vcs,
        path,
        &["commit", "-m", NESTED_IGNORE_COMMIT_MESSAGE],
        CallPolicy::BestEffort,
    )?;
    if commit.success() {
        run_git_with(r.vcs, path, &["push"], CallPolicy::BestEffort)?;
    }
    Ok(())
}
