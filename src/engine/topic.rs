//! Feature and bugfix branches: start and rebase.
//!
//! Both kinds are cut from the development branch and finish back into it.

use super::{Flow, qualify, require_current_of_kind, validate_branch_name};
use crate::error::{GflowError, Result};
use crate::events::{Event, EventAction};
use crate::flow::BranchKind;
use crate::refs::BranchRef;
use crate::state;
use serde_json::json;

/// Option offered when rebasing a branch that has already been published.
const REBASE_ANYWAY: &str = "Rebase anyway";

fn require_topic_kind(kind: BranchKind) -> Result<()> {
    match kind {
        BranchKind::Feature | BranchKind::Bugfix => Ok(()),
        other => Err(GflowError::UserError(format!(
            "'{}' branches are not started from the development branch this way",
            other
        ))),
    }
}

/// Create `{prefix}{name}` from the development branch and check it out.
pub fn start_topic(flow: &Flow<'_>, kind: BranchKind, name: &str) -> Result<BranchRef> {
    require_topic_kind(kind)?;
    let config = flow.config();
    config.require_flow_enabled()?;
    let prefix = config.prefix(kind)?;
    let development = config.development()?;

    let branch = BranchRef::new(qualify(&prefix, name));
    validate_branch_name(flow.repo, branch.name())?;
    if branch.exists(flow.repo)? {
        return Err(GflowError::precondition(format!(
            "branch '{}' already exists.\n\n\
             Pick another name, or finish the existing branch first.",
            branch
        )));
    }

    flow.repo
        .run_required(&["branch", branch.name(), development.name()])?;
    flow.repo.run_required(&["checkout", branch.name()])?;
    tracing::info!(branch = %branch, from = %development, "branch started");

    flow.audit(
        Event::new(EventAction::Start)
            .with_branch(branch.name())
            .with_details(json!({ "kind": kind.as_str(), "base": development.name() })),
    );
    flow.prompter.notify(&format!(
        "Started {} branch '{}' from '{}'.",
        kind, branch, development
    ));
    Ok(branch)
}

/// Rebase the checked-out branch of `kind` onto the development branch.
///
/// A published branch that development has not absorbed yet is only rebased
/// after explicit confirmation. A failed rebase is always aborted.
pub fn rebase(flow: &Flow<'_>, kind: BranchKind) -> Result<BranchRef> {
    require_topic_kind(kind)?;
    let config = flow.config();
    config.require_flow_enabled()?;
    let prefix = config.prefix(kind)?;
    let development = config.development()?;
    let subject = require_current_of_kind(flow.repo, kind, &prefix)?;

    // The confirmation below can block; the cleanliness check after it is
    // evaluated only once the operator has answered.
    let published = subject.remote_at(&flow.remote());
    if published.exists(flow.repo)? && !state::is_merged(flow.repo, &published, &development)? {
        let message = format!(
            "'{}' has been published as '{}'.\n\
             Rebasing rewrites history others may have pulled.",
            subject, published
        );
        if flow.prompter.confirm(&message, &[REBASE_ANYWAY]).is_none() {
            return Err(GflowError::Cancelled);
        }
        tracing::info!(branch = %subject, "rebasing published branch after confirmation");
    }

    state::require_clean(flow.repo)?;

    flow.prompter
        .progress(&format!("Rebasing '{}' onto '{}'", subject, development));
    let output = flow.repo.run(&["rebase", development.name()])?;
    if !output.success() {
        let abort = flow.repo.run(&["rebase", "--abort"])?;
        if !abort.success() {
            tracing::warn!(stderr = %abort.stderr, "rebase --abort failed");
        }
        return Err(GflowError::RebaseFailed {
            branch: subject.name().to_string(),
            onto: development.name().to_string(),
            detail: output.message().to_string(),
        });
    }

    flow.audit(
        Event::new(EventAction::Rebase)
            .with_branch(subject.name())
            .with_details(json!({ "onto": development.name() })),
    );
    flow.prompter
        .notify(&format!("Rebased '{}' onto '{}'.", subject, development));
    Ok(subject)
}
