//! `feature`, `bugfix`, `release` and `hotfix` subcommands.

use crate::cli::{TopicAction, VersionedAction};
use crate::engine::{self, FinishOptions, Flow};
use crate::error::Result;
use crate::flow::BranchKind;
use crate::refs::{BranchRef, list_branches_with_prefix};
use crate::state;

pub fn cmd_topic(flow: &Flow<'_>, kind: BranchKind, action: &TopicAction) -> Result<()> {
    match action {
        TopicAction::Start(args) => engine::start_topic(flow, kind, &args.name).map(|_| ()),
        TopicAction::Finish(args) => {
            let options = FinishOptions {
                name: args.name.clone(),
                message: None,
            };
            engine::finish(flow, kind, options).map(|_| ())
        }
        TopicAction::Rebase => engine::rebase(flow, kind).map(|_| ()),
        TopicAction::List => cmd_list(flow, kind),
    }
}

pub fn cmd_versioned(flow: &Flow<'_>, kind: BranchKind, action: &VersionedAction) -> Result<()> {
    match action {
        VersionedAction::Start(args) => {
            engine::start_versioned(flow, kind, args.version.as_deref()).map(|_| ())
        }
        VersionedAction::Finish(args) => {
            let options = FinishOptions {
                name: args.name.clone(),
                message: args.message.clone(),
            };
            engine::finish(flow, kind, options).map(|_| ())
        }
        VersionedAction::List => cmd_list(flow, kind),
    }
}

fn cmd_list(flow: &Flow<'_>, kind: BranchKind) -> Result<()> {
    let config = flow.config();
    config.require_flow_enabled()?;
    let prefix = config.prefix(kind)?;
    let branches = list_branches_with_prefix(flow.repo, &prefix)?;
    let current = state::current_branch(flow.repo)?;

    for line in listing_lines(kind, &branches, current.as_ref()) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per branch, the checked-out one marked with `*`.
pub(super) fn listing_lines(
    kind: BranchKind,
    branches: &[BranchRef],
    current: Option<&BranchRef>,
) -> Vec<String> {
    if branches.is_empty() {
        return vec![format!("No {} branches.", kind)];
    }
    branches
        .iter()
        .map(|branch| {
            let marker = if Some(branch) == current { '*' } else { ' ' };
            format!("{} {}", marker, branch)
        })
        .collect()
}
