//! Symbolic link entries.

use super::Reconciler;
use super::gitignore;
use super::state::path_present;
use crate::config::SubdirEntry;
use crate::error::{Result, SyncError};
use crate::fs::{create_symlink, ensure_dir, is_symlink_to};
use crate::git::{CallPolicy, run_git_with};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LinkOutcome {
    Created,
    AlreadyLinked,
    /// Something other than the expected link occupies the path.
    Conflict,
}

pub(super) fn reconcile(r: &Reconciler<'_>, entry: &SubdirEntry) -> Result<LinkOutcome> {
    let name = entry.display_name();
    let rel = entry.relative_path();
    let gitignore_path = r.ctx.gitignore_path();

    let patterns: Vec<String> = entry
        .ignore
        .iter()
        .map(|p| gitignore::normalize_entry(p))
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}/{}", rel, p))
        .collect();
    gitignore::merge_entries(&gitignore_path, &patterns)?;

    let target = entry
        .url()
        .ok_or_else(|| SyncError::UserError(format!("link '{}' has no url", name)))?;
    let target = Path::new(target);
    let link = entry.resolve(r.root());

    if path_present(&link) {
        // A relative target is resolved from the directory holding the link.
        let resolved = match link.parent() {
            Some(parent) => parent.join(target),
            None => target.to_path_buf(),
        };
        if is_symlink_to(&link, &resolved) {
            debug!("{} already links to {}", rel, target.display());
            return Ok(LinkOutcome::AlreadyLinked);
        }
        warn!(
            "'{}' exists and is not a link to {}; leaving it untouched",
            rel,
            target.display()
        );
        return Ok(LinkOutcome::Conflict);
    }

    if let Some(parent) = link.parent() {
        ensure_dir(parent)?;
    }
    create_symlink(target, &link)?;
    info!("linked {} -> {}", rel, target.display());

    if entry.is_ignored {
        gitignore::merge_entry(&gitignore_path, &rel)?;
    } else {
        run_git_with(r.vcs, r.root(), &["add", &rel], CallPolicy::BestEffort)?;
    }
    if gitignore_path.exists() {
        run_git_with(r.vcs, r.root(), &["add", ".gitignore"], CallPolicy::BestEffort)?;
    }

    Ok(LinkOutcome::Created)
}
