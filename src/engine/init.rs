//! Gitflow initialization.
//!
//! Every answer is collected before the repository is touched, so cancelling
//! leaves it as it was. The production and development roles are written
//! last; that write is what makes the flow enabled.

use super::{Flow, validate_branch_name};
use crate::error::{GflowError, Result};
use crate::events::{Event, EventAction};
use crate::flow::{BranchKind, Role};
use crate::prompt::PromptSpec;
use crate::refs::{BranchRef, list_local_branches};
use crate::state;
use serde_json::json;

const REINITIALIZE: &str = "Re-initialize";

#[derive(Debug, Clone, Copy, Default)]
pub struct InitOptions {
    /// Accept every default without prompting.
    pub use_defaults: bool,
}

/// The values initialization records.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Answers {
    production: String,
    development: String,
    prefixes: Vec<(BranchKind, String)>,
    version_tag_prefix: String,
}

/// Set up gitflow in the repository.
pub fn initialize(flow: &Flow<'_>, options: &InitOptions) -> Result<()> {
    let config = flow.config();

    if config.flow_enabled()? {
        let chosen = flow.prompter.confirm(
            "Gitflow is already initialized in this repository.",
            &[REINITIALIZE],
        );
        if chosen.is_none() {
            return Err(GflowError::Cancelled);
        }
        tracing::info!("re-initializing gitflow");
    }

    let answers = collect_answers(flow, options)?;
    let production = BranchRef::new(&answers.production);
    let development = BranchRef::new(&answers.development);

    // ========================================================================
    // Branches
    // ========================================================================

    if !state::has_commits(flow.repo)? {
        let head = format!("refs/heads/{}", production);
        flow.repo.run_required(&["symbolic-ref", "HEAD", &head])?;
        flow.repo
            .run_required(&["commit", "--allow-empty", "--quiet", "-m", "Initial commit"])?;
        tracing::info!(branch = %production, "created initial commit");
    }

    let remote = flow.remote();
    let local = list_local_branches(flow.repo)?;

    if !local.contains(&production) {
        let tracked = production.remote_at(&remote);
        if !tracked.exists(flow.repo)? {
            return Err(GflowError::UserError(format!(
                "production branch '{}' does not exist locally or on '{}'",
                production, remote
            )));
        }
        flow.repo.run_required(&[
            "branch",
            "--track",
            production.name(),
            tracked.name(),
        ])?;
    }

    if !local.contains(&development) {
        let tracked = development.remote_at(&remote);
        if tracked.exists(flow.repo)? {
            flow.repo.run_required(&[
                "branch",
                "--track",
                development.name(),
                tracked.name(),
            ])?;
        } else {
            flow.repo.run_required(&[
                "branch",
                "--no-track",
                development.name(),
                production.name(),
            ])?;
        }
        tracing::info!(branch = %development, "created development branch");
    }

    flow.checkout(&development)?;

    // ========================================================================
    // Roles
    // ========================================================================

    for (kind, prefix) in &answers.prefixes {
        config.set(Role::Prefix(*kind), prefix)?;
    }
    config.set(Role::VersionTagPrefix, &answers.version_tag_prefix)?;
    config.set(Role::Production, production.name())?;
    config.set(Role::Development, development.name())?;

    flow.audit(Event::new(EventAction::Init).with_details(json!({
        "production": production.name(),
        "development": development.name(),
        "version_tag_prefix": answers.version_tag_prefix,
    })));
    flow.prompter.notify(&format!(
        "Gitflow initialized: production '{}', development '{}'.",
        production, development
    ));
    Ok(())
}

fn collect_answers(flow: &Flow<'_>, options: &InitOptions) -> Result<Answers> {
    let config = flow.config();
    let settings = flow.settings;
    let existing = |role: Role| -> Result<Option<String>> {
        Ok(config.get(role)?.filter(|value| !value.is_empty()))
    };

    let production = ask(
        flow,
        options,
        "Production branch",
        existing(Role::Production)?.unwrap_or_else(|| settings.default_production.clone()),
    )?;
    let development = ask(
        flow,
        options,
        "Development branch",
        existing(Role::Development)?.unwrap_or_else(|| settings.default_development.clone()),
    )?;
    if production.is_empty() || development.is_empty() {
        return Err(GflowError::Cancelled);
    }
    if production == development {
        return Err(GflowError::UserError(format!(
            "the production and development branches must differ (both are '{}')",
            production
        )));
    }
    validate_branch_name(flow.repo, &production)?;
    validate_branch_name(flow.repo, &development)?;

    let mut prefixes = Vec::with_capacity(BranchKind::ALL.len());
    for kind in BranchKind::ALL {
        let default = existing(Role::Prefix(kind))?
            .unwrap_or_else(|| settings.prefixes.get(kind).to_string());
        let prefix = ask(flow, options, &format!("Prefix for {} branches", kind), default)?;
        if prefix.is_empty() {
            return Err(GflowError::UserError(format!(
                "the {} prefix must not be empty",
                kind
            )));
        }
        prefixes.push((kind, prefix));
    }

    // An explicitly empty version tag prefix is a valid answer.
    let version_tag_prefix = ask(
        flow,
        options,
        "Version tag prefix",
        config
            .get(Role::VersionTagPrefix)?
            .unwrap_or_else(|| settings.version_tag_prefix.clone()),
    )?;

    Ok(Answers {
        production,
        development,
        prefixes,
        version_tag_prefix,
    })
}

/// Prompt with `default`, or take it directly with `--defaults`.
fn ask(flow: &Flow<'_>, options: &InitOptions, message: &str, default: String) -> Result<String> {
    if options.use_defaults {
        return Ok(default);
    }
    flow.prompter
        .prompt(&PromptSpec::new(message).with_default(default))
        .map(|answer| answer.trim().to_string())
        .ok_or(GflowError::Cancelled)
}
