//! Implementation of the `gflow status` command.

use crate::engine::Flow;
use crate::error::Result;
use crate::events::read_events;
use crate::flow::{BranchKind, Role};
use crate::marker::RecoveryMarker;
use crate::state;

/// Print the flow roles, the checked-out branch, any interrupted finish
/// and the last recorded operation.
pub fn cmd_status(flow: &Flow<'_>) -> Result<()> {
    for line in status_lines(flow)? {
        println!("{}", line);
    }
    Ok(())
}

pub(super) fn status_lines(flow: &Flow<'_>) -> Result<Vec<String>> {
    let config = flow.config();
    let mut lines = Vec::new();

    if config.flow_enabled()? {
        for role in [Role::Production, Role::Development] {
            let value = config.get(role)?.unwrap_or_default();
            lines.push(format!("{}: {}", role, value));
        }
        for kind in BranchKind::ALL {
            let value = config
                .get(Role::Prefix(kind))?
                .filter(|prefix| !prefix.is_empty())
                .unwrap_or_else(|| "(not set)".to_string());
            lines.push(format!("{} prefix: {}", kind, value));
        }
        let tag_prefix = config.version_tag_prefix()?;
        lines.push(format!(
            "version tag prefix: {}",
            if tag_prefix.is_empty() {
                "(none)"
            } else {
                tag_prefix.as_str()
            }
        ));
    } else {
        lines.push("gitflow is not initialized (run `gflow init`)".to_string());
    }

    let current = match state::current_branch(flow.repo)? {
        Some(branch) => branch.to_string(),
        None => "(detached HEAD)".to_string(),
    };
    lines.push(format!("current branch: {}", current));

    match RecoveryMarker::new(flow.repo).read()? {
        Some(target) => lines.push(format!(
            "pending finish: merge into '{}' stopped on conflicts; \
             resolve, commit, then run finish again",
            target
        )),
        None => lines.push("pending finish: none".to_string()),
    }

    if let Some(last) = read_events(flow.repo)?.last() {
        let subject = last.branch.as_deref().unwrap_or("-");
        lines.push(format!(
            "last operation: {} {} ({} by {})",
            last.action,
            subject,
            last.ts.format("%Y-%m-%d %H:%M:%S UTC"),
            last.actor
        ));
    }

    Ok(lines)
}
