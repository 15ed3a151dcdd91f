//! Repository root resolution for subsync.
//!
//! Finds the repository root by walking upward from the working directory to
//! the first directory holding `init.yaml`. When no ancestor has one, the
//! enclosing git work tree is used, then the working directory itself; the
//! missing configuration is reported when it is loaded.
//!
//! The resolved root is passed explicitly to every operation. Nothing here
//! changes the process working directory.

use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::{Result, SyncError};
use crate::git;
use std::env;
use std::path::{Path, PathBuf};

/// Lock file name used to serialize reconcile runs.
pub const LOCK_FILE_NAME: &str = "subsync.lock";

/// Resolved paths for one invocation. All paths are absolute.
#[derive(Debug, Clone)]
pub struct RepoContext {
    /// Directory holding `init.yaml`.
    pub repo_root: PathBuf,

    /// `{repo_root}/init.yaml`.
    pub config_path: PathBuf,
}

impl RepoContext {
    /// Resolve from the current working directory, or use `root_override`.
    pub fn resolve(root_override: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            SyncError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        match root_override {
            Some(root) => Ok(Self::at(cwd.join(root))),
            None => Ok(Self::resolve_from(&cwd)),
        }
    }

    /// Resolve starting from a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Self {
        let cwd = cwd.as_ref();

        if let Some(root) = find_config_root(cwd) {
            return Self::at(root);
        }

        let fallback = git::get_repo_root(cwd).unwrap_or_else(|| cwd.to_path_buf());
        tracing::debug!(
            "no {} above '{}', falling back to '{}'",
            CONFIG_FILE_NAME,
            cwd.display(),
            fallback.display()
        );
        Self::at(fallback)
    }

    /// Use `root` as the repository root without discovery.
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        let repo_root = root.into();
        let config_path = repo_root.join(CONFIG_FILE_NAME);
        Self {
            repo_root,
            config_path,
        }
    }

    /// Load `init.yaml`; fails with `ConfigMissing` when it is absent.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.config_path)
    }

    /// Host ignore file.
    pub fn gitignore_path(&self) -> PathBuf {
        self.repo_root.join(".gitignore")
    }

    /// Host submodule mapping file.
    pub fn gitmodules_path(&self) -> PathBuf {
        self.repo_root.join(".gitmodules")
    }

    /// Host `.git` directory (may not exist yet).
    pub fn git_dir(&self) -> PathBuf {
        self.repo_root.join(".git")
    }

    /// Internal metadata directory git keeps for the submodule at `rel`.
    pub fn module_metadata_dir(&self, rel: &str) -> PathBuf {
        self.git_dir().join("modules").join(rel)
    }

    /// Reconcile lock location: inside `.git` when it is a directory.
    pub fn lock_path(&self) -> PathBuf {
        let git_dir = self.git_dir();
        if git_dir.is_dir() {
            git_dir.join(LOCK_FILE_NAME)
        } else {
            self.repo_root.join(format!(".{}", LOCK_FILE_NAME))
        }
    }

    /// Resolve a user-supplied path (e.g. `--target`) against the root.
    pub fn resolve_against_root(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.repo_root.join(path)
        }
    }
}

/// First directory from `start` upward that contains `init.yaml`.
fn find_config_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}
