//! Repository state queries built on the reference model.
//!
//! Every mutating workflow step is guarded by one of these predicates, so
//! merges, deletes and pushes only run against a known state.

use crate::context::Repository;
use crate::error::{GflowError, Remedy, Result};
use crate::refs::{BranchRef, RemoteRef, parse_listing};

/// Whether HEAD points at a commit (false in a freshly initialized repository).
pub fn has_commits(repo: &Repository) -> Result<bool> {
    Ok(repo
        .run(&["rev-parse", "--verify", "--quiet", "HEAD"])?
        .success())
}

/// True iff there are no unstaged and no staged changes to tracked files.
///
/// Submodule-only differences are ignored.
pub fn is_clean(repo: &Repository) -> Result<bool> {
    let unstaged = diff_is_empty(
        repo,
        &[
            "diff",
            "--no-ext-diff",
            "--ignore-submodules",
            "--quiet",
            "--exit-code",
        ],
    )?;
    let staged = diff_is_empty(
        repo,
        &[
            "diff-index",
            "--cached",
            "--quiet",
            "--ignore-submodules",
            "HEAD",
            "--",
        ],
    )?;
    Ok(unstaged && staged)
}

/// `git diff --quiet` style check: exit 0 is empty, 1 is dirty, anything else is an error.
fn diff_is_empty(repo: &Repository, args: &[&str]) -> Result<bool> {
    let output = repo.run(args)?;
    match output.code {
        0 => Ok(true),
        1 => Ok(false),
        _ => repo.run_required(args).map(|_| true),
    }
}

/// True iff `base` is among the branches whose history contains `subject`.
pub fn is_merged(repo: &Repository, subject: &BranchRef, base: &BranchRef) -> Result<bool> {
    let local = repo.run_required(&["branch", "--no-color", "--contains", subject.name()])?;
    let remote = repo.run_required(&[
        "branch",
        "--no-color",
        "-r",
        "--contains",
        subject.name(),
    ])?;
    let containing = parse_listing(&format!("{}\n{}", local.stdout, remote.stdout));
    Ok(containing.contains(base))
}

/// The checked-out branch, or `None` when HEAD is detached.
pub fn current_branch(repo: &Repository) -> Result<Option<BranchRef>> {
    let output = repo.run(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
    if output.success() && !output.is_empty() {
        Ok(Some(BranchRef::new(output.stdout)))
    } else {
        Ok(None)
    }
}

/// Fail unless the working tree is clean.
pub fn require_clean(repo: &Repository) -> Result<()> {
    if is_clean(repo)? {
        Ok(())
    } else {
        Err(GflowError::precondition(
            "the working tree has uncommitted changes.\n\n\
             Commit or stash them before continuing.",
        ))
    }
}

/// Fail unless `a` and `b` point at the same commit.
///
/// With `pull_from`, the failure offers to pull that remote into `a`.
pub fn require_equal(
    repo: &Repository,
    a: &BranchRef,
    b: &BranchRef,
    pull_from: Option<&RemoteRef>,
) -> Result<()> {
    if a.revision(repo)? == b.revision(repo)? {
        return Ok(());
    }

    let message = format!(
        "branches '{}' and '{}' have diverged.\n\n\
         Bring them back in sync before continuing.",
        a, b
    );
    Err(match pull_from {
        Some(remote) => GflowError::with_remedy(message, Remedy::pull(remote.name(), a.name())),
        None => GflowError::precondition(message),
    })
}

/// If `branch` has a counterpart on `remote`, require both to point at the same commit.
pub fn require_in_sync(repo: &Repository, branch: &BranchRef, remote: &RemoteRef) -> Result<()> {
    let counterpart = branch.remote_at(remote);
    if counterpart.exists(repo)? {
        require_equal(repo, branch, &counterpart, Some(remote))
    } else {
        tracing::debug!(branch = %branch, "no remote counterpart, skipping sync check");
        Ok(())
    }
}
