//! Host repository steps: remote setup, bootstrap and the closing commit.

use super::{Reconciler, gitignore};
use crate::error::Result;
use crate::fs::{atomic_write_file, ensure_dir};
use crate::git::{
    CallPolicy, has_commits, has_staged_changes, probe, remote_exists, run_git_with,
};
use tracing::{debug, info, warn};

/// Content of a generated ignore file.
pub(super) const BOOTSTRAP_IGNORE: &str = "# subsync\n";

pub(super) const INITIAL_COMMIT_MESSAGE: &str = "chore: initial commit with .gitignore";

pub(super) const SYNC_COMMIT_MESSAGE: &str = "chore: sync subdirectories and gitignore";

/// Point the host at `init.git-url` and check out the configured branch.
///
/// Returns false when no URL is configured.
pub(super) fn setup_remote(r: &Reconciler<'_>) -> Result<bool> {
    let Some(url) = r.settings.url() else {
        warn!("init.git-url is empty; skipping host remote setup");
        return Ok(false);
    };
    let root = r.root();
    let remote = r.settings.remote();
    let branch = r.settings.branch();

    ensure_repository(r)?;

    if remote_exists(r.vcs, root, remote)? {
        run_git_with(r.vcs, root, &["remote", "set-url", remote, url], CallPolicy::Required)?;
    } else {
        run_git_with(r.vcs, root, &["remote", "add", remote, url], CallPolicy::Required)?;
    }

    info!("fetching {} ({})", remote, url);
    run_git_with(r.vcs, root, &["fetch", remote], CallPolicy::BestEffort)?;

    let upstream = format!("{}/{}", remote, branch);
    let tracked = probe(r.vcs, root, &["checkout", "-B", branch, &upstream])?;
    if !tracked.success() {
        debug!("{} not available: {}", upstream, tracked.message());
        run_git_with(r.vcs, root, &["checkout", "-B", branch], CallPolicy::BestEffort)?;
    }

    Ok(true)
}

/// `git init` the root when it has no `.git`, with HEAD on the configured branch.
///
/// Returns true if a repository was created.
pub(super) fn ensure_repository(r: &Reconciler<'_>) -> Result<bool> {
    if r.ctx.git_dir().exists() {
        return Ok(false);
    }
    let root = r.root();

    info!("initializing git repository in {}", root.display());
    run_git_with(r.vcs, root, &["init"], CallPolicy::Required)?;
    let head = format!("refs/heads/{}", r.settings.branch());
    run_git_with(r.vcs, root, &["symbolic-ref", "HEAD", &head], CallPolicy::Required)?;

    exclude_root_lock(r)?;
    Ok(true)
}

/// Keep the root-level lock file (taken before `.git` existed) out of the index.
fn exclude_root_lock(r: &Reconciler<'_>) -> Result<()> {
    let git_dir = r.ctx.git_dir();
    if !git_dir.is_dir() {
        return Ok(());
    }
    let info_dir = git_dir.join("info");
    ensure_dir(&info_dir)?;
    let entry = format!(".{}", crate::context::LOCK_FILE_NAME);
    gitignore::merge_entry(&info_dir.join("exclude"), &entry)?;
    Ok(())
}

/// Give an empty repository its first commit holding only `.gitignore`.
///
/// Returns true if the commit was made.
pub(super) fn ensure_initial_commit(r: &Reconciler<'_>) -> Result<bool> {
    ensure_repository(r)?;
    let root = r.root();

    if has_commits(r.vcs, root)? {
        return Ok(false);
    }

    let gitignore = r.ctx.gitignore_path();
    if !gitignore.exists() {
        atomic_write_file(&gitignore, BOOTSTRAP_IGNORE)?;
    }

    info!("creating initial commit");
    run_git_with(r.vcs, root, &["add", ".gitignore"], CallPolicy::Required)?;
    // Pathspec limits the commit to the ignore file even if other paths are staged.
    run_git_with(
        r.vcs,
        root,
        &["commit", "-m", INITIAL_COMMIT_MESSAGE, "--", ".gitignore"],
        CallPolicy::Required,
    )?;
    Ok(true)
}

/// Outcome of the closing host commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Finalized {
    pub committed: bool,
    pub pushed: bool,
}

/// Stage everything, commit if anything is staged, push if the remote exists.
pub(super) fn finalize(r: &Reconciler<'_>) -> Result<Finalized> {
    let root = r.root();
    let mut result = Finalized::default();

    run_git_with(r.vcs, root, &["add", "-A"], CallPolicy::BestEffort)?;

    if has_staged_changes(r.vcs, root)? {
        info!("committing host changes");
        result.committed = run_git_with(
            r.vcs,
            root,
            &["commit", "-m", SYNC_COMMIT_MESSAGE],
            CallPolicy::BestEffort,
        )?
        .success();
    } else {
        info!("nothing to commit in host repository");
    }

    let remote = r.settings.remote();
    if remote_exists(r.vcs, root, remote)? {
        let branch = r.settings.branch();
        info!("pushing {} to {}", branch, remote);
        result.pushed = run_git_with(
            r.vcs,
            root,
            &["push", "-u", remote, branch],
            CallPolicy::BestEffort,
        )?
        .success();
    } else {
        debug!("remote {} not configured; not pushing", remote);
    }

    Ok(result)
}
