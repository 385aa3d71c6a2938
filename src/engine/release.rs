//! Release and hotfix branches: start.
//!
//! At most one branch of each of these kinds is in flight at a time. The
//! name doubles as the version that finishing will tag.

use super::{Flow, qualify, validate_branch_name};
use crate::error::{GflowError, Remedy, Result};
use crate::events::{Event, EventAction};
use crate::flow::{BranchKind, Role};
use crate::prompt::PromptSpec;
use crate::refs::{BranchRef, TagRef, list_branches_with_prefix};
use crate::state;
use crate::version;
use serde_json::json;

/// Start a release (from development) or hotfix (from production).
///
/// Without `name`, the operator is prompted with the next version guessed
/// from the latest tag; a blank answer cancels.
pub fn start_versioned(flow: &Flow<'_>, kind: BranchKind, name: Option<&str>) -> Result<BranchRef> {
    if !kind.is_versioned() {
        return Err(GflowError::UserError(format!(
            "'{}' branches do not carry a version",
            kind
        )));
    }

    let config = flow.config();
    config.require_flow_enabled()?;
    let prefix = config.prefix(kind)?;
    let tag_prefix = config.version_tag_prefix()?;
    let production = config.production()?;
    let development = config.development()?;
    let base = match kind.base() {
        Role::Production => production.clone(),
        _ => development.clone(),
    };

    // ========================================================================
    // Preconditions
    // ========================================================================

    match list_branches_with_prefix(flow.repo, &prefix)?.as_slice() {
        [] => {}
        [existing] => {
            return Err(GflowError::with_remedy(
                format!(
                    "{} branch '{}' is already in progress.\n\n\
                     Finish it before starting another.",
                    kind, existing
                ),
                Remedy::checkout(existing.name()),
            ));
        }
        existing => {
            let names: Vec<&str> = existing.iter().map(BranchRef::name).collect();
            return Err(GflowError::precondition(format!(
                "{} branches are already in progress: {}",
                kind,
                names.join(", ")
            )));
        }
    }

    state::require_clean(flow.repo)?;
    let remote = flow.remote();
    state::require_in_sync(flow.repo, &production, &remote)?;
    state::require_in_sync(flow.repo, &development, &remote)?;

    // ========================================================================
    // Name
    // ========================================================================

    let version = match name {
        Some(name) => name.strip_prefix(prefix.as_str()).unwrap_or(name).to_string(),
        None => {
            let guess = version::suggest(flow.repo, &tag_prefix, kind)?;
            let spec = PromptSpec::new(format!("{} name", capitalize(kind.as_str())))
                .with_default(guess)
                .with_placeholder("1.2.0");
            match flow.prompter.prompt(&spec) {
                Some(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
                _ => return Err(GflowError::Cancelled),
            }
        }
    };

    let branch = BranchRef::new(qualify(&prefix, &version));
    validate_branch_name(flow.repo, branch.name())?;

    let tag = TagRef::new(format!("{}{}", tag_prefix, version));
    if tag.exists(flow.repo)? {
        return Err(GflowError::precondition(format!(
            "tag '{}' already exists; pick another version",
            tag
        )));
    }

    // ========================================================================
    // Create and check out
    // ========================================================================

    flow.repo
        .run_required(&["branch", branch.name(), base.name()])?;
    flow.repo.run_required(&["checkout", branch.name()])?;
    tracing::info!(branch = %branch, from = %base, "branch started");

    flow.audit(
        Event::new(EventAction::Start)
            .with_branch(branch.name())
            .with_details(json!({
                "kind": kind.as_str(),
                "base": base.name(),
                "version": version,
            })),
    );
    flow.prompter.notify(&format!(
        "Started {} branch '{}' from '{}'.",
        kind, branch, base
    ));
    Ok(branch)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
