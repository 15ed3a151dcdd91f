//! Config loading, validation, and accessor operations.

use super::model::{Config, InitSettings, SubdirEntry};
use super::types::{EntryKind, LineEnding};
use crate::error::{SyncError, Result};
use globset::Glob;
use std::path::{Component, Path, PathBuf};

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(SyncError::ConfigMissing)` - The file does not exist
    /// * `Err(SyncError::UserError)` - Read, parse or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SyncError::ConfigMissing(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown keys are silently ignored.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| SyncError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return an error on the first invalid one.
    ///
    /// Validation rules:
    /// - `init.line-splitter` must be one of LF, CRLF, CR, NONE
    /// - every `subdir[].path` is non-empty and stays under the repository root
    /// - every `subdir[].name` is a relative path that stays under the target
    /// - every `subdir[].symlink` item stays under its entry
    /// - every `subdir[].ignore` pattern is a valid glob
    pub fn validate(&self) -> Result<()> {
        if LineEnding::from_str(&self.init.line_splitter).is_none() {
            return Err(SyncError::UserError(format!(
                "config validation failed: line-splitter must be one of LF, CRLF, CR, NONE (found '{}')",
                self.init.line_splitter
            )));
        }

        for (index, entry) in self.subdir.iter().enumerate() {
            let rel = entry.relative_path();
            if rel.is_empty() {
                return Err(SyncError::UserError(format!(
                    "config validation failed: subdir[{}].path must be non-empty",
                    index
                )));
            }
            if !stays_inside(&rel) {
                return Err(SyncError::UserError(format!(
                    "config validation failed: subdir[{}].path '{}' must stay inside the repository root",
                    index, entry.path
                )));
            }

            let name = entry.display_name();
            if name.is_empty() || !stays_inside(&name) {
                return Err(SyncError::UserError(format!(
                    "config validation failed: name '{}' of '{}' must be a relative path without '..'",
                    name, entry.path
                )));
            }

            for target in entry.symlink_targets() {
                if !stays_inside(&target) {
                    return Err(SyncError::UserError(format!(
                        "config validation failed: symlink '{}' of '{}' must stay inside the entry",
                        target, entry.path
                    )));
                }
            }

            for pattern in &entry.ignore {
                Glob::new(pattern.trim()).map_err(|e| {
                    SyncError::UserError(format!(
                        "config validation failed: invalid ignore pattern '{}' in '{}': {}",
                        pattern, entry.path, e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// The configured line-ending policy.
    pub fn line_ending(&self) -> LineEnding {
        LineEnding::from_str(&self.init.line_splitter).unwrap_or_default()
    }
}

impl InitSettings {
    /// Remote name, falling back to "origin" when blank.
    pub fn remote(&self) -> &str {
        match self.git_remote.trim() {
            "" => "origin",
            remote => remote,
        }
    }

    /// Host branch, falling back to "main" when blank.
    pub fn branch(&self) -> &str {
        match self.git_branch.trim() {
            "" => "main",
            branch => branch,
        }
    }

    /// Remote URL, if configured and non-blank.
    pub fn url(&self) -> Option<&str> {
        self.git_url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Backup folder relative to the root, if configured and non-blank.
    pub fn backup_folder(&self) -> Option<String> {
        self.backup_folder
            .as_deref()
            .map(normalize_relative)
            .filter(|p| !p.is_empty())
    }
}

impl SubdirEntry {
    /// `path` with surrounding whitespace and leading `./` or `/` removed.
    pub fn relative_path(&self) -> String {
        normalize_relative(&self.path)
    }

    /// Absolute location of this entry under `repo_root`.
    pub fn resolve(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(self.relative_path())
    }

    /// Explicit `name` (normalized like `path`), or the last segment of `path`.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(normalize_relative)
            && !name.is_empty()
        {
            return name;
        }
        let rel = self.relative_path();
        rel.rsplit('/').next().unwrap_or_default().to_string()
    }

    /// Classified entry type, `None` when the `type` value is unknown.
    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::from_str(self.entry_type.as_deref().unwrap_or(""))
    }

    /// The raw `type` value for diagnostics.
    pub fn type_label(&self) -> &str {
        self.entry_type.as_deref().unwrap_or("gitsubmodule")
    }

    /// Submodule branch, falling back to "main".
    pub fn branch(&self) -> &str {
        match self.branch.as_deref().map(str::trim) {
            Some(b) if !b.is_empty() => b,
            _ => "main",
        }
    }

    /// Remote URL (or link target for `ln` entries), if non-blank.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// `symlink` items relative to the entry, leading slashes stripped, blanks dropped.
    pub fn symlink_targets(&self) -> Vec<String> {
        self.symlink
            .iter()
            .map(|s| s.trim().trim_start_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Trim and strip any run of leading `./` and `/` segments; use forward slashes.
pub(crate) fn normalize_relative(raw: &str) -> String {
    let mut s = raw.trim().replace('\\', "/");
    loop {
        if let Some(rest) = s.strip_prefix("./") {
            s = rest.to_string();
        } else if let Some(rest) = s.strip_prefix('/') {
            s = rest.to_string();
        } else {
            break;
        }
    }
    if s == "." {
        s.clear();
    }
    s.trim_end_matches('/').to_string()
}

/// True if a normalized relative path has no parent or root components.
fn stays_inside(rel: &str) -> bool {
    Path::new(rel)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
