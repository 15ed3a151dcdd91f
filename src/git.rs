//! Git command runner for subsync.
//!
//! All version-control work goes through the [`Vcs`] capability so the
//! reconciler can be driven by a fake in tests. Each call site declares a
//! [`CallPolicy`]: `Required` calls turn a non-zero exit into an error,
//! `BestEffort` calls log the failure and carry on.

use crate::error::{Result, SyncError};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default)]
pub struct GitOutput {
    /// Process exit code (-1 when killed by a signal).
    pub exit_code: i32,
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    /// Create a new GitOutput from raw process output.
    fn from_output(output: &Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true for a zero exit code.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stderr if present, otherwise stdout.
    pub fn message(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Whether a failing git call aborts the current unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPolicy {
    /// Non-zero exit becomes `SyncError::GitError`.
    Required,
    /// Non-zero exit is logged and returned as output.
    BestEffort,
}

/// Capability to run the version-control tool.
///
/// Implementations return `Err` only when the tool cannot be started at all;
/// a non-zero exit is reported through [`GitOutput::exit_code`].
pub trait Vcs {
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<GitOutput>;
}

/// Runs the `git` executable found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    /// `key=value` pairs passed as `-c` before every command.
    overrides: Vec<String>,
}

impl SystemGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `-c key=value` override to every invocation.
    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.overrides.push(format!("{}={}", key, value));
        self
    }
}

impl Vcs for SystemGit {
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<GitOutput> {
        let mut command = Command::new("git");
        for pair in &self.overrides {
            command.arg("-c").arg(pair);
        }

        let output = command
            .current_dir(cwd)
            .args(args)
            .output()
            .map_err(|e| {
                SyncError::GitError(format!(
                    "failed to execute git {}: {} (is git installed?)",
                    args.first().unwrap_or(&""),
                    e
                ))
            })?;

        Ok(GitOutput::from_output(&output))
    }
}

/// Run a git command under the given policy.
///
/// # Returns
///
/// * `Ok(GitOutput)` - On success, or on any exit code under `BestEffort`
/// * `Err(SyncError::GitError)` - On non-zero exit under `Required`, or spawn failure
pub fn run_git_with(
    vcs: &dyn Vcs,
    cwd: &Path,
    args: &[&str],
    policy: CallPolicy,
) -> Result<GitOutput> {
    tracing::debug!(cwd = %cwd.display(), "git {}", args.join(" "));
    let output = vcs.run(cwd, args)?;

    if output.success() {
        return Ok(output);
    }

    match policy {
        CallPolicy::Required => Err(SyncError::GitError(format!(
            "git {} failed (exit code {}): {}",
            args.join(" "),
            output.exit_code,
            output.message()
        ))),
        CallPolicy::BestEffort => {
            tracing::warn!(
                "git {} failed (exit code {}): {}",
                args.join(" "),
                output.exit_code,
                output.message()
            );
            Ok(output)
        }
    }
}

/// Run a query whose exit code is the answer (e.g. `diff --cached --quiet`).
///
/// Neither success nor failure is logged as a problem.
pub fn probe(vcs: &dyn Vcs, cwd: &Path, args: &[&str]) -> Result<GitOutput> {
    tracing::debug!(cwd = %cwd.display(), "git {}", args.join(" "));
    vcs.run(cwd, args)
}

/// Run a required git command with the system git.
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    run_git_with(&SystemGit::new(), cwd.as_ref(), args, CallPolicy::Required)
}

/// Get the work tree root containing `cwd` using `git rev-parse --show-toplevel`.
///
/// Returns `None` outside a git repository.
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Option<PathBuf> {
    let output = SystemGit::new()
        .run(cwd.as_ref(), &["rev-parse", "--show-toplevel"])
        .ok()?;
    if output.success() && !output.stdout.is_empty() {
        Some(PathBuf::from(output.stdout))
    } else {
        None
    }
}

/// True if `HEAD` resolves to a commit.
pub fn has_commits(vcs: &dyn Vcs, repo: &Path) -> Result<bool> {
    Ok(probe(vcs, repo, &["rev-parse", "--verify", "--quiet", "HEAD"])?.success())
}

/// True if the index differs from `HEAD` (something is staged).
pub fn has_staged_changes(vcs: &dyn Vcs, repo: &Path) -> Result<bool> {
    // `--quiet` exits 1 when there are differences.
    Ok(!probe(vcs, repo, &["diff", "--cached", "--quiet"])?.success())
}

/// True if the named remote is configured.
pub fn remote_exists(vcs: &dyn Vcs, repo: &Path, remote: &str) -> Result<bool> {
    Ok(probe(vcs, repo, &["remote", "get-url", remote])?.success())
}

/// True if `git_ref` resolves (e.g. `origin/main`).
pub fn ref_exists(vcs: &dyn Vcs, repo: &Path, git_ref: &str) -> Result<bool> {
    Ok(probe(vcs, repo, &["rev-parse", "--verify", "--quiet", git_ref])?.success())
}
