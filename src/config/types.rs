//! Configuration enums and default values.

use serde::{Deserialize, Serialize};

/// Line-ending policy applied by the projector (`init.line-splitter`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Byte-identical copy, no decode attempt.
    #[default]
    None,
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
    /// `\r`
    Cr,
}

impl LineEnding {
    /// Parse a policy name, ignoring case and surrounding whitespace.
    ///
    /// An empty string is the `None` policy.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Some(Self::None),
            "LF" => Some(Self::Lf),
            "CRLF" => Some(Self::Crlf),
            "CR" => Some(Self::Cr),
            _ => None,
        }
    }

    /// The separator written for this policy, `None` for byte-identical copies.
    pub fn separator(&self) -> Option<&'static str> {
        match self {
            LineEnding::None => None,
            LineEnding::Lf => Some("\n"),
            LineEnding::Crlf => Some("\r\n"),
            LineEnding::Cr => Some("\r"),
        }
    }
}

/// How a `subdir` entry is linked into the host repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// A git submodule (`type: gitsubmodule`).
    NestedRepo,
    /// A symbolic link to an external path (`type: ln`).
    SymbolicLink,
}

impl EntryKind {
    /// Classify a raw `type` value. Returns `None` for unknown types.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "gitsubmodule" => Some(Self::NestedRepo),
            "ln" => Some(Self::SymbolicLink),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::NestedRepo => write!(f, "gitsubmodule"),
            EntryKind::SymbolicLink => write!(f, "ln"),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_remote() -> String {
    "origin".to_string()
}
pub(crate) fn default_branch() -> String {
    "main".to_string()
}
pub(crate) fn default_line_splitter() -> String {
    "NONE".to_string()
}
