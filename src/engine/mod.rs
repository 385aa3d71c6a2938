//! Workflow engine: one module per gitflow operation.
//!
//! Every operation runs against a [`Flow`], which bundles the repository the
//! invocation resolved at entry, the user settings, and the prompter. Engine
//! functions only validate, mutate through the repository's runner, and
//! report through the prompter; printing errors and offering remedies is the
//! dispatcher's job.

pub mod finish;
pub mod init;
pub mod release;
pub mod topic;

use crate::config::Settings;
use crate::context::Repository;
use crate::error::{GflowError, Remedy, Result};
use crate::events::{Event, append_event};
use crate::flow::{BranchKind, FlowConfig};
use crate::prompt::Prompter;
use crate::refs::{BranchRef, RemoteRef, list_branches_with_prefix};
use crate::state;

pub use finish::{FinishOptions, FinishReport, finish};
pub use init::{InitOptions, initialize};
pub use release::start_versioned;
pub use topic::{rebase, start_topic};

/// Everything an operation needs, captured once per invocation.
pub struct Flow<'a> {
    pub repo: &'a Repository,
    pub settings: &'a Settings,
    pub prompter: &'a dyn Prompter,
}

impl<'a> Flow<'a> {
    pub fn new(repo: &'a Repository, settings: &'a Settings, prompter: &'a dyn Prompter) -> Self {
        Self {
            repo,
            settings,
            prompter,
        }
    }

    pub fn config(&self) -> FlowConfig<'a> {
        FlowConfig::new(self.repo)
    }

    /// The primary remote named in the settings.
    pub fn remote(&self) -> RemoteRef {
        RemoteRef::new(&self.settings.remote)
    }

    /// Append to the audit log; failures are logged and otherwise ignored.
    pub fn audit(&self, event: Event) {
        if let Err(e) = append_event(self.repo, &event) {
            tracing::warn!(action = %event.action, error = %e, "failed to append audit event");
        }
    }

    /// Check out `branch` unless it is already current.
    pub(crate) fn checkout(&self, branch: &BranchRef) -> Result<()> {
        if state::current_branch(self.repo)?.as_ref() == Some(branch) {
            return Ok(());
        }
        self.repo.run_required(&["checkout", branch.name()])?;
        Ok(())
    }
}

/// `name` with `prefix` prepended, unless it already carries it.
pub fn qualify(prefix: &str, name: &str) -> String {
    if name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{}{}", prefix, name)
    }
}

/// Reject empty names and names git would not accept as a branch.
pub(crate) fn validate_branch_name(repo: &Repository, name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed != name {
        return Err(GflowError::UserError(format!(
            "'{}' is not a valid branch name",
            name
        )));
    }
    if !repo
        .run(&["check-ref-format", "--branch", name])?
        .success()
    {
        return Err(GflowError::UserError(format!(
            "'{}' is not a valid branch name",
            name
        )));
    }
    Ok(())
}

/// The checked-out branch, which must carry `prefix`.
///
/// Otherwise fails; when exactly one branch of `kind` exists, the failure
/// offers to check it out.
pub(crate) fn require_current_of_kind(
    repo: &Repository,
    kind: BranchKind,
    prefix: &str,
) -> Result<BranchRef> {
    if let Some(current) = state::current_branch(repo)?
        && current.name().starts_with(prefix)
    {
        return Ok(current);
    }
    Err(not_on_kind(repo, kind, prefix)?)
}

pub(crate) fn not_on_kind(repo: &Repository, kind: BranchKind, prefix: &str) -> Result<GflowError> {
    let candidates = list_branches_with_prefix(repo, prefix)?;
    let message = format!("Not on a {} branch ({}*).", kind, prefix);
    Ok(match candidates.as_slice() {
        [only] => GflowError::with_remedy(
            format!("{}\n\nThe only {} branch is '{}'.", message, kind, only),
            Remedy::checkout(only.name()),
        ),
        [] => GflowError::precondition(format!(
            "{}\n\nThere are no {} branches; start one with `gflow {} start`.",
            message, kind, kind
        )),
        _ => GflowError::precondition(format!(
            "{}\n\nCheck out the one to use, or name it explicitly.",
            message
        )),
    })
}
