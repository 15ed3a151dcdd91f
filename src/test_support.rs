use crate::error::Result;
use crate::git::{GitOutput, SystemGit, Vcs};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// A repository on `main` with one commit.
pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = create_empty_repo();
    let path = temp_dir.path();

    std::fs::write(path.join("README.md"), "# Test\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    temp_dir
}

/// A freshly initialized repository on an unborn `main` branch.
pub(crate) fn create_empty_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    init_repo(temp_dir.path());
    temp_dir
}

/// A bare repository usable as a remote URL.
///
/// When `branch` is given it holds one commit on that branch.
pub(crate) fn create_bare_remote(branch: Option<&str>) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let bare = temp_dir.path().join("remote.git");
    std::fs::create_dir_all(&bare).unwrap();
    git(&bare, &["init", "--bare"]);
    git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    if let Some(branch) = branch {
        push_branch(&bare, branch);
    }

    temp_dir
}

/// Path of the bare repository inside a `create_bare_remote` directory.
pub(crate) fn bare_path(remote: &TempDir) -> PathBuf {
    remote.path().join("remote.git")
}

/// Push a one-commit branch into an existing bare repository.
pub(crate) fn push_branch(bare: &Path, branch: &str) {
    let seed = TempDir::new().unwrap();
    init_repo(seed.path());
    std::fs::write(seed.path().join("README.md"), format!("# {}\n", branch)).unwrap();
    git(seed.path(), &["add", "."]);
    git(seed.path(), &["commit", "-m", "seed"]);
    git(
        seed.path(),
        &["push", &bare.to_string_lossy(), &format!("HEAD:refs/heads/{}", branch)],
    );
}

fn init_repo(path: &Path) {
    git(path, &["init"]);
    // Ensure the repo uses a deterministic default branch name across environments.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
}

/// System git configured for hermetic tests.
///
/// Submodule clones do not inherit the superproject's local config, so the
/// identity and the `file://` transport allowance are passed on every call.
pub(crate) fn test_git() -> SystemGit {
    SystemGit::new()
        .with_config("protocol.file.allow", "always")
        .with_config("user.email", "test@example.com")
        .with_config("user.name", "Test User")
        .with_config("init.defaultBranch", "main")
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

type Hook = Box<dyn Fn(&Path, &[&str])>;

struct Rule {
    prefix: Vec<String>,
    exit_code: i32,
    stdout: String,
}

/// One recorded invocation.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub cwd: PathBuf,
    pub args: Vec<String>,
}

/// Scripted [`Vcs`] that records every call.
///
/// Rules are matched by argument prefix in insertion order; unmatched calls
/// succeed with empty output. Hooks run after a matching call succeeds, so a
/// test can emulate side effects such as `submodule add` creating `.git`.
#[derive(Default)]
pub(crate) struct FakeGit {
    rules: Vec<Rule>,
    hooks: Vec<(Vec<String>, Hook)>,
    calls: RefCell<Vec<Call>>,
}

impl FakeGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_on(self, prefix: &[&str], exit_code: i32) -> Self {
        self.respond(prefix, exit_code, "")
    }

    pub(crate) fn respond(mut self, prefix: &[&str], exit_code: i32, stdout: &str) -> Self {
        self.rules.push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            exit_code,
            stdout: stdout.to_string(),
        });
        self
    }

    pub(crate) fn on_success(
        mut self,
        prefix: &[&str],
        hook: impl Fn(&Path, &[&str]) + 'static,
    ) -> Self {
        self.hooks.push((
            prefix.iter().map(|s| s.to_string()).collect(),
            Box::new(hook),
        ));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Every call rendered as `"arg arg arg"`.
    pub(crate) fn commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|c| c.args.join(" "))
            .collect()
    }

    /// Index of the first call starting with `prefix`.
    pub(crate) fn position(&self, prefix: &str) -> Option<usize> {
        self.commands().iter().position(|c| c.starts_with(prefix))
    }

    fn matches(prefix: &[String], args: &[&str]) -> bool {
        prefix.len() <= args.len() && prefix.iter().zip(args).all(|(p, a)| p == a)
    }
}

impl Vcs for FakeGit {
    fn run(&self, cwd: &Path, args: &[&str]) -> Result<GitOutput> {
        self.calls.borrow_mut().push(Call {
            cwd: cwd.to_path_buf(),
            args: args.iter().map(|s| s.to_string()).collect(),
        });

        let output = self
            .rules
            .iter()
            .find(|rule| Self::matches(&rule.prefix, args))
            .map(|rule| GitOutput {
                exit_code: rule.exit_code,
                stdout: rule.stdout.clone(),
                stderr: if rule.exit_code == 0 {
                    String::new()
                } else {
                    "fatal: scripted failure".to_string()
                },
            })
            .unwrap_or_default();

        if output.success() {
            for (prefix, hook) in &self.hooks {
                if Self::matches(prefix, args) {
                    hook(cwd, args);
                }
            }
        }

        Ok(output)
    }
}
