use crate::context::Repository;
use crate::error::{GflowError, Result};
use crate::git::{GitOutput, Runner};
use crate::prompt::{PromptSpec, Prompter};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;
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

/// Repository with a single commit on `master`.
pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = create_empty_repo();
    let path = temp_dir.path();

    std::fs::write(path.join("README.md"), "# Test\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    temp_dir
}

/// Repository with no commits; HEAD is an unborn `master`.
pub(crate) fn create_empty_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init", "--quiet"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    git(path, &["config", "tag.gpgsign", "false"]);

    temp_dir
}

/// Repository with `master` and `develop` and the gitflow roles already recorded,
/// checked out on `develop`.
pub(crate) fn create_flow_repo() -> TempDir {
    let temp_dir = create_test_repo();
    let path = temp_dir.path();

    git(path, &["branch", "develop", "master"]);
    git(path, &["checkout", "--quiet", "develop"]);
    for (key, value) in [
        ("gitflow.prefix.feature", "feature/"),
        ("gitflow.prefix.bugfix", "bugfix/"),
        ("gitflow.prefix.release", "release/"),
        ("gitflow.prefix.hotfix", "hotfix/"),
        ("gitflow.prefix.support", "support/"),
        ("gitflow.prefix.versiontag", ""),
        ("gitflow.branch.master", "master"),
        ("gitflow.branch.develop", "develop"),
    ] {
        git(path, &["config", key, value]);
    }

    temp_dir
}

/// Flow repository plus a bare `origin` that both long-lived branches are pushed to.
///
/// Returns `(work, origin)`; keep both alive for the duration of the test.
pub(crate) fn create_flow_repo_with_origin() -> (TempDir, TempDir) {
    let work = create_flow_repo();
    let origin = TempDir::new().unwrap();

    git(origin.path(), &["init", "--quiet", "--bare"]);
    let origin_url = origin.path().to_string_lossy().to_string();
    git(work.path(), &["remote", "add", "origin", &origin_url]);
    git(work.path(), &["push", "--quiet", "origin", "master", "develop"]);

    (work, origin)
}

/// Commit a file with the given content on the current branch.
pub(crate) fn commit_file(repo_dir: &Path, file: &str, content: &str, message: &str) {
    std::fs::write(repo_dir.join(file), content).unwrap();
    git(repo_dir, &["add", file]);
    git(repo_dir, &["commit", "--quiet", "-m", message]);
}

/// Run git in `repo_dir`, panicking on failure, returning trimmed stdout.
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

/// Shared record of the git invocations a [`ScriptedGit`] received.
pub(crate) type CallLog = Rc<RefCell<Vec<String>>>;

/// A [`Runner`] that replays canned outputs keyed by the joined argument list.
///
/// Responses for the same command are consumed in order; the last one repeats.
/// Any command without a response fails, so tests notice unexpected git calls.
#[derive(Default)]
pub(crate) struct ScriptedGit {
    responses: RefCell<HashMap<String, VecDeque<GitOutput>>>,
    calls: CallLog,
}

impl ScriptedGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(self, args: &str, output: GitOutput) -> Self {
        self.responses
            .borrow_mut()
            .entry(args.to_string())
            .or_default()
            .push_back(output);
        self
    }

    pub(crate) fn calls(&self) -> CallLog {
        Rc::clone(&self.calls)
    }

    /// Wrap into a repository whose git dir is `git_dir`.
    pub(crate) fn into_repo(self, git_dir: &Path) -> Repository {
        Repository::with_runner(
            git_dir.to_path_buf(),
            git_dir.to_path_buf(),
            Box::new(self),
        )
    }
}

impl Runner for ScriptedGit {
    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        let key = args.join(" ");
        self.calls.borrow_mut().push(key.clone());

        let mut responses = self.responses.borrow_mut();
        let queue = responses
            .get_mut(&key)
            .ok_or_else(|| GflowError::GitError(format!("unexpected git call: {}", key)))?;
        let output = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        output.ok_or_else(|| GflowError::GitError(format!("no response left for: {}", key)))
    }
}

/// A [`Prompter`] that replays queued answers and records what it was told.
///
/// With an empty prompt queue, prompts take their defaults; with an empty
/// confirm queue, confirmations are declined.
#[derive(Default)]
pub(crate) struct ScriptedPrompter {
    answers: RefCell<VecDeque<Option<String>>>,
    confirms: RefCell<VecDeque<Option<String>>>,
    pub(crate) prompts: RefCell<Vec<PromptSpec>>,
    pub(crate) confirmations: RefCell<Vec<String>>,
    pub(crate) notifications: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn answer(self, value: Option<&str>) -> Self {
        self.answers
            .borrow_mut()
            .push_back(value.map(str::to_string));
        self
    }

    pub(crate) fn choose(self, option: Option<&str>) -> Self {
        self.confirms
            .borrow_mut()
            .push_back(option.map(str::to_string));
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, spec: &PromptSpec) -> Option<String> {
        self.prompts.borrow_mut().push(spec.clone());
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => answer,
            None => spec.default.clone(),
        }
    }

    fn confirm(&self, message: &str, _options: &[&str]) -> Option<String> {
        self.confirmations.borrow_mut().push(message.to_string());
        self.confirms.borrow_mut().pop_front().flatten()
    }

    fn notify(&self, message: &str) {
        self.notifications.borrow_mut().push(message.to_string());
    }

    fn progress(&self, _message: &str) {}
}
