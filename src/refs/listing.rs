//! Parsing of git's textual ref listings.
//!
//! This is the only place raw `git branch` / `git tag` output is interpreted.

use super::{BranchRef, TagRef};
use std::collections::HashSet;

/// Glyphs git prints in front of a listed branch: `*` for the current
/// branch, `+` for one checked out in another worktree.
const MARKER_GLYPHS: &[char] = &['*', '+'];

/// Parse `git branch` output into an ordered, de-duplicated set of branches.
///
/// Blank lines, the detached-HEAD sentinel (`(HEAD detached at ...)`,
/// `(no branch)`) and symbolic aliases (`origin/HEAD -> origin/main`) are
/// dropped. The first occurrence of a name wins.
pub fn parse_listing(raw: &str) -> Vec<BranchRef> {
    dedup_names(raw.lines().filter_map(|line| {
        let name = strip_marker(line.trim());
        if name.is_empty() || name.starts_with('(') || name.contains(" -> ") {
            None
        } else {
            Some(name)
        }
    }))
    .into_iter()
    .map(BranchRef::new)
    .collect()
}

/// Parse `git tag` output into an ordered, de-duplicated set of tags.
pub fn parse_tag_listing(raw: &str) -> Vec<TagRef> {
    dedup_names(raw.lines().map(str::trim).filter(|line| !line.is_empty()))
        .into_iter()
        .map(TagRef::new)
        .collect()
}

fn strip_marker(line: &str) -> &str {
    match line.strip_prefix(MARKER_GLYPHS) {
        Some(rest) if rest.starts_with(' ') => rest.trim_start(),
        _ => line,
    }
}

fn dedup_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    names.filter(|name| seen.insert(*name)).collect()
}
