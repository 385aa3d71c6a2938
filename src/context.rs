//! Repository resolution for gflow.
//!
//! The repository an invocation works on is resolved exactly once, at entry,
//! into a [`Repository`] value. Every query and every backend call receives
//! that value explicitly; nothing reads the process working directory later.

use crate::error::{GflowError, Result};
use crate::git::{self, GitOutput, Runner, SystemGit};
use std::env;
use std::path::{Path, PathBuf};

/// File under the git directory that records an interrupted finish.
pub const MERGE_MARKER_FILE: &str = ".gitflow-merge-marker";

/// Directory under the git directory holding gflow's own state.
pub const STATE_DIR: &str = "gflow";

/// The repository an operation runs against, plus the runner that talks to it.
pub struct Repository {
    /// Absolute path to the work tree root.
    pub root: PathBuf,

    /// Absolute path to the git directory (usually `{root}/.git`).
    pub git_dir: PathBuf,

    runner: Box<dyn Runner>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("git_dir", &self.git_dir)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Resolve the repository containing the current working directory.
    pub fn discover() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            GflowError::UserError(format!("failed to get current working directory: {}", e))
        })?;
        Self::open(cwd)
    }

    /// Resolve the repository containing `path`, using the system git binary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let probe = SystemGit::from_env(path.as_ref());
        let (root, git_dir) = git::locate_repository(&probe)?;
        let runner = SystemGit::from_env(&root);
        Ok(Self::with_runner(root, git_dir, Box::new(runner)))
    }

    /// Build a repository around an explicit runner (used by tests).
    pub fn with_runner(root: PathBuf, git_dir: PathBuf, runner: Box<dyn Runner>) -> Self {
        Self {
            root,
            git_dir,
            runner,
        }
    }

    pub fn runner(&self) -> &dyn Runner {
        self.runner.as_ref()
    }

    /// Run a git command, inspecting the exit code is up to the caller.
    pub fn run(&self, args: &[&str]) -> Result<GitOutput> {
        self.runner.run(args)
    }

    /// Run a git command that must succeed.
    pub fn run_required(&self, args: &[&str]) -> Result<GitOutput> {
        self.runner.run_required(args)
    }

    /// Path of the Recovery Marker file.
    pub fn marker_path(&self) -> PathBuf {
        self.git_dir.join(MERGE_MARKER_FILE)
    }

    /// Directory for gflow's local, untracked state.
    pub fn state_dir(&self) -> PathBuf {
        self.git_dir.join(STATE_DIR)
    }

    /// Default location of the user settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.state_dir().join("config.yaml")
    }

    /// Path to the audit log.
    pub fn events_file(&self) -> PathBuf {
        self.state_dir().join("events.ndjson")
    }
}
