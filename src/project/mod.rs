//! Projection of configured sources into an external target directory.
//!
//! For every `subdir` entry the source under the repository root is copied to
//! `<target>/<name>`:
//!
//! 1. A single-file source is copied directly.
//! 2. A directory source is walked; entries matching an ignore pattern or
//!    listed under `symlink` are not copied (ignored directories are not
//!    descended into).
//! 3. Each `symlink` item is then recreated in the copy as an absolute link
//!    back to the original source path.
//!
//! Before anything in the target is written, a non-empty target is
//! snapshotted into `<backup-folder>/<YYYYMMDD_HHMMSS>` unless backups are
//! suppressed. A failed snapshot aborts the run; per-entry failures are
//! logged and the remaining entries still run.

mod backup;
mod ignore;
mod transform;


pub use backup::{TIMESTAMP_FORMAT, snapshot};
pub use ignore::IgnoreMatcher;
pub use transform::{convert_line_endings, copy_file};

use crate::config::{Config, LineEnding, SubdirEntry};
use crate::context::RepoContext;
use crate::error::Result;
use crate::fs::{create_symlink, ensure_dir, remove_existing};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Inputs for one projection run.
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    /// Absolute target directory.
    pub target_root: PathBuf,
    /// Take a snapshot of the existing target first.
    pub backup: bool,
    /// Invocation time; names the snapshot.
    pub started_at: DateTime<Local>,
}

/// What one entry's projection did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryStats {
    pub files_copied: usize,
    pub symlinks_created: usize,
    pub symlinks_missing: usize,
    pub source_missing: bool,
}

/// Totals for a projection run.
#[derive(Debug, Clone, Default)]
pub struct ProjectionReport {
    pub backup: Option<PathBuf>,
    pub entries_projected: usize,
    pub entries_skipped: usize,
    pub entries_failed: usize,
    pub files_copied: usize,
    pub symlinks_created: usize,
}

/// Project every configured entry into `opts.target_root`.
pub fn project_all(
    ctx: &RepoContext,
    config: &Config,
    opts: &ProjectOptions,
) -> Result<ProjectionReport> {
    let mut report = ProjectionReport::default();

    if opts.backup
        && let Some(folder) = config.init.backup_folder()
    {
        let backup_folder = ctx.repo_root.join(folder);
        report.backup = snapshot(&opts.target_root, &backup_folder, opts.started_at)?;
    }

    ensure_dir(&opts.target_root)?;
    let line_ending = config.line_ending();

    for entry in &config.subdir {
        let name = entry.display_name();

        if entry.kind().is_none() {
            tracing::warn!("unknown type '{}', skipping: {}", entry.type_label(), name);
            report.entries_skipped += 1;
            continue;
        }

        match project_entry(entry, &opts.target_root, &ctx.repo_root, line_ending) {
            Ok(stats) if stats.source_missing => report.entries_skipped += 1,
            Ok(stats) => {
                report.entries_projected += 1;
                report.files_copied += stats.files_copied;
                report.symlinks_created += stats.symlinks_created;
            }
            Err(e) => {
                tracing::error!("failed to project '{}': {}", name, e);
                report.entries_failed += 1;
            }
        }
    }

    Ok(report)
}

/// Project a single entry into `target_root/<name>`.
pub fn project_entry(
    entry: &SubdirEntry,
    target_root: &Path,
    repo_root: &Path,
    line_ending: LineEnding,
) -> Result<EntryStats> {
    let mut stats = EntryStats::default();
    let source = entry.resolve(repo_root);
    let dest = target_root.join(entry.display_name());

    if !source.exists() {
        tracing::warn!("source path does not exist, skipping: {}", source.display());
        stats.source_missing = true;
        return Ok(stats);
    }

    if source.is_file() {
        copy_file(&source, &dest, line_ending)?;
        stats.files_copied = 1;
        return Ok(stats);
    }

    let matcher = IgnoreMatcher::new(&entry.ignore)?;
    let symlinks = entry.symlink_targets();
    let excluded: HashSet<&str> = symlinks.iter().map(String::as_str).collect();

    stats.files_copied = copy_tree(&source, &dest, &matcher, &excluded, line_ending)?;

    for rel in &symlinks {
        let link_path = dest.join(rel);
        let target = match source.join(rel).canonicalize() {
            Ok(target) => target,
            Err(_) => {
                tracing::warn!(
                    "symlink source does not exist, skipping: {}",
                    source.join(rel).display()
                );
                stats.symlinks_missing += 1;
                continue;
            }
        };

        remove_existing(&link_path)?;
        if let Some(parent) = link_path.parent() {
            ensure_dir(parent)?;
        }
        match create_symlink(&target, &link_path) {
            Ok(()) => stats.symlinks_created += 1,
            Err(e) => tracing::warn!("{}", e),
        }
    }

    Ok(stats)
}

/// Copy the directory tree at `source` into `dest`. Returns files copied.
fn copy_tree(
    source: &Path,
    dest: &Path,
    matcher: &IgnoreMatcher,
    excluded: &HashSet<&str>,
    line_ending: LineEnding,
) -> Result<usize> {
    replace_dir_link(dest)?;
    ensure_dir(dest)?;
    let mut copied = 0;

    let walker = WalkDir::new(source)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let rel = relative_key(source, e.path());
            let name = e.file_name().to_string_lossy();
            !matcher.is_ignored(&name, &rel) && !excluded.contains(rel.as_str())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable path under '{}': {}", source.display(), e);
                continue;
            }
        };

        let rel = relative_key(source, entry.path());
        let target = dest.join(&rel);

        if entry.file_type().is_dir() {
            replace_dir_link(&target)?;
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            copy_file(entry.path(), &target, line_ending)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Remove a symlink sitting where a directory is about to be filled.
///
/// An earlier run may have linked this path back into the source; writing
/// through it would overwrite the source files.
fn replace_dir_link(path: &Path) -> Result<()> {
    if std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) {
        tracing::debug!("replacing symlink with directory: {}", path.display());
        remove_existing(path)?;
    }
    Ok(())
}

/// Path of `path` relative to `root`, with forward slashes.
fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
