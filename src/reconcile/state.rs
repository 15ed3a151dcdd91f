//! Binding state of a nested repository.
//!
//! ```text
//!   Unbound --add ok--> Bound
//!   Unbound --add failed--> PartiallyBound
//!   PartiallyBound --teardown, add ok--> Bound
//!   PartiallyBound --teardown, add failed--> (give up)
//! ```
//!
//! A run that starts from leftovers of an earlier failure (a registered
//! section or module metadata without a checked-out repository) is observed
//! as `PartiallyBound` and goes straight to teardown.

use crate::context::RepoContext;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Nothing registered at the path.
    Unbound,
    /// Half-registered: must be torn down before binding again.
    PartiallyBound,
    /// The path holds a repository (`.git` marker present).
    Bound,
}

/// Result of one `submodule add` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Succeeded,
    Failed,
}

impl From<bool> for BindOutcome {
    fn from(success: bool) -> Self {
        if success {
            BindOutcome::Succeeded
        } else {
            BindOutcome::Failed
        }
    }
}

/// What the driver has to do next in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindStep {
    /// `submodule add -b <branch>`.
    BindWithBranch,
    /// Tear down leftovers, then `submodule add` without a branch.
    RecoverAndBind,
    /// Resolve the branch inside the repository.
    ResolveBranch,
}

impl BindingState {
    /// Inspect the filesystem for the submodule at `rel`.
    pub fn observe(ctx: &RepoContext, rel: &str) -> Self {
        let path = ctx.repo_root.join(rel);
        if path.join(".git").exists() {
            return BindingState::Bound;
        }

        let registered = fs::read_to_string(ctx.gitmodules_path())
            .map(|text| has_module_section(&text, rel))
            .unwrap_or(false);
        if registered || ctx.module_metadata_dir(rel).exists() {
            return BindingState::PartiallyBound;
        }

        BindingState::Unbound
    }

    pub fn step(self) -> BindStep {
        match self {
            BindingState::Unbound => BindStep::BindWithBranch,
            BindingState::PartiallyBound => BindStep::RecoverAndBind,
            BindingState::Bound => BindStep::ResolveBranch,
        }
    }

    /// Next state after running `self.step()`; `None` means give up.
    pub fn transition(self, outcome: BindOutcome) -> Option<BindingState> {
        match (self, outcome) {
            (BindingState::Bound, _) => Some(BindingState::Bound),
            (_, BindOutcome::Succeeded) => Some(BindingState::Bound),
            (BindingState::Unbound, BindOutcome::Failed) => Some(BindingState::PartiallyBound),
            (BindingState::PartiallyBound, BindOutcome::Failed) => None,
        }
    }
}

/// True if `.gitmodules` text declares `[submodule "<rel>"]`.
fn has_module_section(text: &str, rel: &str) -> bool {
    let header = format!("[submodule \"{}\"]", rel);
    text.lines().any(|line| line.trim() == header)
}

/// Whether `path` exists at all (including dangling links).
pub(super) fn path_present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unbound_add_success_binds() {
        let state = BindingState::Unbound;
        assert_eq!(state.step(), BindStep::BindWithBranch);
        assert_eq!(
            state.transition(BindOutcome::Succeeded),
            Some(BindingState::Bound)
        );
    }

    #[test]
    fn unbound_add_failure_needs_recovery() {
        let next = BindingState::Unbound
            .transition(BindOutcome::Failed)
            .unwrap();
        assert_eq!(next, BindingState::PartiallyBound);
        assert_eq!(next.step(), BindStep::RecoverAndBind);
    }

    #[test]
    fn recovery_success_binds_and_failure_gives_up() {
        let state = BindingState::PartiallyBound;
        assert_eq!(
            state.transition(BindOutcome::Succeeded),
            Some(BindingState::Bound)
        );
        assert_eq!(state.transition(BindOutcome::Failed), None);
    }

    #[test]
    fn bound_is_terminal() {
        let state = BindingState::Bound;
        assert_eq!(state.step(), BindStep::ResolveBranch);
        assert_eq!(state.transition(BindOutcome::Failed), Some(BindingState::Bound));
    }

    #[test]
    fn observe_empty_root_is_unbound() {
        let temp = TempDir::new().unwrap();
        let ctx = RepoContext::at(temp.path());
        assert_eq!(BindingState::observe(&ctx, "libs/a"), BindingState::Unbound);
    }

    #[test]
    fn observe_git_marker_is_bound() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("libs/a")).unwrap();
        // Submodule checkouts use a `.git` file, plain clones a directory.
        std::fs::write(temp.path().join("libs/a/.git"), "gitdir: ../../.git/modules/libs/a\n")
            .unwrap();
        let ctx = RepoContext::at(temp.path());
        assert_eq!(BindingState::observe(&ctx, "libs/a"), BindingState::Bound);
    }

    #[test]
    fn observe_leftover_section_is_partial() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".gitmodules"),
            "[submodule \"libs/a\"]\n\tpath = libs/a\n\turl = /x\n",
        )
        .unwrap();
        let ctx = RepoContext::at(temp.path());
        assert_eq!(
            BindingState::observe(&ctx, "libs/a"),
            BindingState::PartiallyBound
        );
        assert_eq!(BindingState::observe(&ctx, "libs/b"), BindingState::Unbound);
    }

    #[test]
    fn observe_leftover_metadata_is_partial() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".git/modules/libs/a")).unwrap();
        let ctx = RepoContext::at(temp.path());
        assert_eq!(
            BindingState::observe(&ctx, "libs/a"),
            BindingState::PartiallyBound
        );
    }
}
