//! Git command runner for gflow.
//!
//! Every git invocation goes through a [`Runner`]. `run` reports the exit code
//! instead of failing on it, so callers that treat a non-zero exit as an answer
//! (`git config --get`, `git diff --quiet`, `git merge`) can inspect it;
//! `run_required` is the variant that turns a non-zero exit into an error.

use crate::error::{GflowError, Result};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Environment variable that overrides the git executable.
pub const GIT_EXECUTABLE_ENV: &str = "GFLOW_GIT";

/// Captured result of a git command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    /// Process exit code (-1 when terminated by a signal).
    pub code: i32,
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }

    /// Returns stdout lines as a vector.
    pub fn lines(&self) -> Vec<&str> {
        if self.stdout.is_empty() {
            Vec::new()
        } else {
            self.stdout.lines().collect()
        }
    }

    /// The most useful diagnostic text: stderr, or stdout when stderr is empty.
    pub fn message(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Executes git sub-commands against one repository.
pub trait Runner {
    /// Run `git <args>`. Only a failure to spawn the process is an error.
    fn run(&self, args: &[&str]) -> Result<GitOutput>;

    /// Run `git <args>`, mapping a non-zero exit to [`GflowError::GitError`].
    fn run_required(&self, args: &[&str]) -> Result<GitOutput> {
        let output = self.run(args)?;
        if output.success() {
            Ok(output)
        } else {
            Err(GflowError::GitError(format!(
                "git {} failed (exit code {}): {}",
                args.join(" "),
                output.code,
                output.message()
            )))
        }
    }
}

/// Runs the real git binary in a fixed working directory.
#[derive(Debug, Clone)]
pub struct SystemGit {
    executable: PathBuf,
    cwd: PathBuf,
}

impl SystemGit {
    pub fn new(executable: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            cwd: cwd.into(),
        }
    }

    /// Use the executable named by `GFLOW_GIT`, or `git` from `PATH`.
    pub fn from_env(cwd: impl Into<PathBuf>) -> Self {
        let executable = std::env::var_os(GIT_EXECUTABLE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("git"));
        Self::new(executable, cwd)
    }
}

impl Runner for SystemGit {
    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        let output = Command::new(&self.executable)
            .current_dir(&self.cwd)
            .args(args)
            .output()
            .map_err(|e| {
                GflowError::GitError(format!(
                    "failed to execute {} {}: {}",
                    self.executable.display(),
                    args.first().unwrap_or(&""),
                    e
                ))
            })?;

        let git_output = GitOutput::from_output(&output);
        tracing::debug!(args = %args.join(" "), code = git_output.code, "git");
        Ok(git_output)
    }
}

/// Locate the work tree root and the git directory for `runner`'s directory.
///
/// Returns a user error (exit 1) rather than a git error when the directory
/// is not inside a repository.
pub fn locate_repository(runner: &dyn Runner) -> Result<(PathBuf, PathBuf)> {
    let toplevel = runner.run(&["rev-parse", "--show-toplevel"])?;
    if !toplevel.success() {
        let stderr = toplevel.message();
        return Err(
            if stderr.contains("not a git repository") || stderr.contains("fatal:") {
                GflowError::UserError(
                    "not inside a git repository. Run this command from within a git repository, \
                     or pass -C <path>."
                        .to_string(),
                )
            } else {
                GflowError::UserError(format!("git command failed: {}", stderr))
            },
        );
    }

    let git_dir = runner.run_required(&["rev-parse", "--absolute-git-dir"])?;
    Ok((
        PathBuf::from(&toplevel.stdout),
        PathBuf::from(&git_dir.stdout),
    ))
}
