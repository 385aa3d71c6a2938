//! Next-version suggestions for release and hotfix names.

use crate::context::Repository;
use crate::error::Result;
use crate::flow::BranchKind;
use crate::refs::TagRef;
use regex::Regex;
use std::sync::LazyLock;

/// Version assumed when the repository has no tags yet.
pub const INITIAL_VERSION: &str = "0.0.0";

static SEMVER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("Invalid semver regex"));

/// Which component of the version to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    /// `x.y.z` -> `x.(y+1).0`
    Minor,
    /// `x.y.z` -> `x.y.(z+1)`
    Patch,
}

impl Bump {
    /// Release names bump the minor version, everything else the patch.
    pub fn for_kind(kind: BranchKind) -> Self {
        match kind {
            BranchKind::Release => Bump::Minor,
            _ => Bump::Patch,
        }
    }
}

/// Suggest the next version from `latest_tag`.
///
/// The tag prefix is stripped first. Only `major.minor.patch` remainders are
/// incremented; anything else, including a component at `u64::MAX`, is
/// returned unchanged.
pub fn guess_next(latest_tag: Option<&str>, tag_prefix: &str, bump: Bump) -> String {
    let latest = latest_tag.unwrap_or(INITIAL_VERSION);
    let stripped = latest.strip_prefix(tag_prefix).unwrap_or(latest);

    let Some(caps) = SEMVER_REGEX.captures(stripped) else {
        return stripped.to_string();
    };
    let component = |i: usize| caps[i].parse::<u64>().ok();
    let (Some(major), Some(minor), Some(patch)) = (component(1), component(2), component(3))
    else {
        return stripped.to_string();
    };

    let next = match bump {
        Bump::Minor => minor
            .checked_add(1)
            .map(|minor| format!("{}.{}.0", major, minor)),
        Bump::Patch => patch
            .checked_add(1)
            .map(|patch| format!("{}.{}.{}", major, minor, patch)),
    };
    next.unwrap_or_else(|| stripped.to_string())
}

/// Suggested name for a new release or hotfix branch, based on the latest tag.
pub fn suggest(repo: &Repository, tag_prefix: &str, kind: BranchKind) -> Result<String> {
    let latest = TagRef::latest(repo)?;
    Ok(guess_next(
        latest.as_ref().map(TagRef::name),
        tag_prefix,
        Bump::for_kind(kind),
    ))
}
