//! Config struct definitions and default implementations.

use super::types::*;
use serde::{Deserialize, Deserializer, Serialize};

/// The parsed `init.yaml` document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host repository settings.
    #[serde(deserialize_with = "null_as_default")]
    pub init: InitSettings,

    /// Ordered list of configured sources.
    #[serde(deserialize_with = "null_as_default")]
    pub subdir: Vec<SubdirEntry>,
}

/// The `init` block: host remote, branch, backup folder and line endings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct InitSettings {
    /// Name of the host remote (default: "origin").
    #[serde(default = "default_remote")]
    pub git_remote: String,

    /// Host branch (default: "main").
    #[serde(default = "default_branch")]
    pub git_branch: String,

    /// Host remote URL. When absent the host remote is left alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,

    /// Where projection snapshots go, relative to the repository root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_folder: Option<String>,

    /// One of LF, CRLF, CR, NONE.
    #[serde(default = "default_line_splitter")]
    pub line_splitter: String,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            git_remote: default_remote(),
            git_branch: default_branch(),
            git_url: None,
            backup_folder: None,
            line_splitter: default_line_splitter(),
        }
    }
}

/// One configured source under `subdir`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SubdirEntry {
    /// Location relative to the repository root (required).
    pub path: String,

    /// Display and destination name; defaults to the last path segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Raw `type` value; see [`EntryKind::from_str`].
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,

    /// Glob patterns excluded from projection, or ignore-file lines when reconciling.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,

    /// Sub-paths projected as symlinks back into the source instead of copied.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub symlink: Vec<String>,

    /// Remote URL for submodules, link target for `ln` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Submodule branch (default: "main").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// For `ln` entries, also add the link path itself to the host ignore file.
    pub is_ignored: bool,
}

/// Treat an explicit YAML `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
