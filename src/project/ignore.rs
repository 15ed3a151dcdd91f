//! Ignore-pattern matching for projection.
//!
//! Each pattern is compiled twice: as written, and prefixed with `**/` so that
//! nested-path patterns such as `build/*.o` also match deeper in the tree.
//! Candidates are the entry's bare name and its path relative to the entry
//! root. `*` never crosses a `/`, so a name pattern cannot swallow a path.

use crate::error::{Result, SyncError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
}

impl IgnoreMatcher {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let normalized = pattern.trim().replace('\\', "/");
            let normalized = normalized.trim_end_matches('/');
            if normalized.is_empty() {
                continue;
            }
            for candidate in [normalized.to_string(), format!("**/{}", normalized)] {
                let glob = GlobBuilder::new(&candidate)
                    .literal_separator(true)
                    .build()
                    .map_err(|e| {
                        SyncError::UserError(format!(
                            "invalid ignore pattern '{}': {}",
                            pattern, e
                        ))
                    })?;
                builder.add(glob);
            }
        }

        let set = builder
            .build()
            .map_err(|e| SyncError::UserError(format!("failed to compile ignore patterns: {}", e)))?;
        Ok(Self { set })
    }

    /// True if the entry named `name` at relative path `rel` is excluded.
    pub fn is_ignored(&self, name: &str, rel: &str) -> bool {
        self.set.is_match(name) || self.set.is_match(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> IgnoreMatcher {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        IgnoreMatcher::new(&owned).unwrap()
    }

    #[test]
    fn matches_bare_name_at_any_depth() {
        let m = matcher(&["*.tmp"]);
        assert!(m.is_ignored("a.tmp", "a.tmp"));
        assert!(m.is_ignored("b.tmp", "x/y/b.tmp"));
        assert!(!m.is_ignored("keep.txt", "x/keep.txt"));
    }

    #[test]
    fn matches_nested_path_pattern() {
        let m = matcher(&["build/*.o"]);
        assert!(m.is_ignored("main.o", "build/main.o"));
        assert!(m.is_ignored("main.o", "crate/build/main.o"));
        assert!(!m.is_ignored("main.o", "src/main.o"));
    }

    #[test]
    fn wildcard_does_not_span_directories() {
        let m = matcher(&["c*e"]);
        assert!(m.is_ignored("cache", "cache"));
        assert!(m.is_ignored("cache", "deep/cache"));
        assert!(!m.is_ignored("config", "config"));
        assert!(!m.is_ignored("base", "config/base"));
    }

    #[test]
    fn nested_path_pattern_matches_at_any_depth() {
        let m = matcher(&["build/*.o"]);
        assert!(m.is_ignored("main.o", "a/b/build/main.o"));
        assert!(!m.is_ignored("main.o", "build/sub/main.o"));
    }

    #[test]
    fn trailing_slash_matches_directory_name() {
        let m = matcher(&["node_modules/"]);
        assert!(m.is_ignored("node_modules", "web/node_modules"));
    }

    #[test]
    fn empty_pattern_list_matches_nothing() {
        let m = matcher(&[]);
        assert!(!m.is_ignored("anything", "anything"));
    }

    #[test]
    fn blank_patterns_are_skipped() {
        let m = matcher(&["  ", ""]);
        assert!(!m.is_ignored("a", "a"));
    }

    #[test]
    fn invalid_pattern_is_user_error() {
        let err = IgnoreMatcher::new(&["[oops".to_string()]).unwrap_err();
        assert!(matches!(err, SyncError::UserError(_)));
    }
}
