//! Reference model: typed branch, remote and tag identifiers.
//!
//! Listing queries return ordered, de-duplicated sets. Raw git output never
//! leaves this module; see [`listing`] for the parsers.

mod listing;

pub use listing::{parse_listing, parse_tag_listing};

use crate::context::Repository;
use crate::error::Result;
use std::fmt;

/// A branch, identified by its full name (`feature/login`, `origin/develop`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchRef {
    name: String,
}

impl BranchRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The same branch as seen on `remote` (`{remote}/{name}`).
    ///
    /// Pure string composition; the result may not exist.
    pub fn remote_at(&self, remote: &RemoteRef) -> BranchRef {
        BranchRef::new(format!("{}/{}", remote.name(), self.name))
    }

    /// Whether the branch appears in the combined local and remote listing.
    pub fn exists(&self, repo: &Repository) -> Result<bool> {
        Ok(list_all_branches(repo)?.contains(self))
    }

    /// The commit this branch points at.
    pub fn revision(&self, repo: &Repository) -> Result<String> {
        let output = repo.run_required(&["rev-parse", "--verify", "--quiet", &self.name])?;
        Ok(output.stdout)
    }

    /// The part of the name after `prefix`, if it starts with it.
    pub fn strip_prefix(&self, prefix: &str) -> Option<&str> {
        self.name.strip_prefix(prefix)
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A configured remote, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRef {
    name: String,
}

impl RemoteRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the remote is configured in the repository.
    pub fn exists(&self, repo: &Repository) -> Result<bool> {
        Ok(list_remotes(repo)?.contains(self))
    }
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A tag, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagRef {
    name: String,
}

impl TagRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self, repo: &Repository) -> Result<bool> {
        Ok(list_tags(repo)?.contains(self))
    }

    /// The tag on the most recently tagged commit, if any commit is tagged.
    pub fn latest(repo: &Repository) -> Result<Option<TagRef>> {
        let commit = repo.run(&["rev-list", "--tags", "--date-order", "--max-count=1"])?;
        if !commit.success() || commit.is_empty() {
            return Ok(None);
        }

        let described = repo.run_required(&["describe", "--tags", "--abbrev=0", &commit.stdout])?;
        Ok(parse_tag_listing(&described.stdout).into_iter().next())
    }
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Raw `git branch` output for the given extra arguments.
///
/// A repository with no commits has no branches; git's complaint about the
/// unborn HEAD is treated as an empty listing.
fn branch_listing(repo: &Repository, extra: &[&str]) -> Result<String> {
    let mut args = vec!["branch", "--no-color"];
    args.extend_from_slice(extra);

    let output = repo.run(&args)?;
    if output.success() {
        return Ok(output.stdout);
    }
    if !crate::state::has_commits(repo)? {
        return Ok(String::new());
    }
    repo.run_required(&args).map(|output| output.stdout)
}

/// Local branches.
pub fn list_local_branches(repo: &Repository) -> Result<Vec<BranchRef>> {
    Ok(parse_listing(&branch_listing(repo, &[])?))
}

/// Local and remote-tracking branches, parsed in one pass.
pub fn list_all_branches(repo: &Repository) -> Result<Vec<BranchRef>> {
    let local = branch_listing(repo, &[])?;
    let remote = branch_listing(repo, &["-r"])?;
    Ok(parse_listing(&format!("{}\n{}", local, remote)))
}

/// Local branches whose name starts with `prefix`.
pub fn list_branches_with_prefix(repo: &Repository, prefix: &str) -> Result<Vec<BranchRef>> {
    Ok(list_local_branches(repo)?
        .into_iter()
        .filter(|branch| branch.name().starts_with(prefix))
        .collect())
}

pub fn list_tags(repo: &Repository) -> Result<Vec<TagRef>> {
    let output = repo.run_required(&["tag", "--list"])?;
    Ok(parse_tag_listing(&output.stdout))
}

pub fn list_remotes(repo: &Repository) -> Result<Vec<RemoteRef>> {
    let output = repo.run_required(&["remote"])?;
    Ok(parse_tag_listing(&output.stdout)
        .into_iter()
        .map(|name| RemoteRef::new(name.name()))
        .collect())
}
