//! Command implementations for gflow.
//!
//! The dispatcher resolves the repository and settings once, routes the
//! command to the workflow engine, and owns the remediation loop: when an
//! operation fails with a remedy attached, the operator is offered it, and
//! if accepted the remedy runs and the command is re-run exactly once.

mod branch;
mod status;


use crate::cli::{Cli, Command};
use crate::config::{SETTINGS_PATH_ENV, Settings};
use crate::context::Repository;
use crate::engine::{self, Flow, InitOptions};
use crate::error::{GflowError, RemedyAction, Result};
use crate::flow::BranchKind;
use crate::prompt::Prompter;
use crate::refs::BranchRef;
use crate::state;
use std::path::{Path, PathBuf};

/// Dispatch a command to its implementation.
///
/// Operator cancellation ends the command successfully and silently.
pub fn dispatch(cli: &Cli, prompter: &dyn Prompter) -> Result<()> {
    let repo = open_repository(cli.repo.as_deref())?;
    let settings = load_settings(&repo, cli.config.as_deref())?;
    let flow = Flow::new(&repo, &settings, prompter);

    let err = match execute(&flow, &cli.command) {
        Ok(()) | Err(GflowError::Cancelled) => return Ok(()),
        Err(err) => err,
    };
    let Some(remedy) = err.remedy().cloned() else {
        return Err(err);
    };

    if prompter
        .confirm(&err.to_string(), &[remedy.label.as_str()])
        .is_none()
    {
        tracing::debug!(remedy = %remedy.label, "remedy declined");
        return Ok(());
    }

    tracing::info!(remedy = %remedy.label, "applying remedy");
    apply_remedy(&flow, &remedy.action)?;

    // One retry; a second failure is reported as-is.
    match execute(&flow, &cli.command) {
        Ok(()) | Err(GflowError::Cancelled) => Ok(()),
        Err(err) => Err(err),
    }
}

fn execute(flow: &Flow<'_>, command: &Command) -> Result<()> {
    match command {
        Command::Init(args) => engine::initialize(
            flow,
            &InitOptions {
                use_defaults: args.defaults,
            },
        ),
        Command::Feature(cmd) => branch::cmd_topic(flow, BranchKind::Feature, &cmd.action),
        Command::Bugfix(cmd) => branch::cmd_topic(flow, BranchKind::Bugfix, &cmd.action),
        Command::Release(cmd) => branch::cmd_versioned(flow, BranchKind::Release, &cmd.action),
        Command::Hotfix(cmd) => branch::cmd_versioned(flow, BranchKind::Hotfix, &cmd.action),
        Command::Status => status::cmd_status(flow),
    }
}

/// Perform a remedy the operator accepted.
fn apply_remedy(flow: &Flow<'_>, action: &RemedyAction) -> Result<()> {
    let repo = flow.repo;
    match action {
        RemedyAction::Pull { remote, branch } => {
            let current = state::current_branch(repo)?;
            if current.as_ref().map(BranchRef::name) == Some(branch.as_str()) {
                repo.run_required(&["pull", "--ff-only", remote, branch])?;
            } else {
                let refspec = format!("{}:{}", branch, branch);
                repo.run_required(&["fetch", remote, &refspec])?;
            }
            Ok(())
        }
        RemedyAction::Checkout { branch } => {
            repo.run_required(&["checkout", branch])?;
            Ok(())
        }
        RemedyAction::Initialize => engine::initialize(flow, &InitOptions::default()),
    }
}

fn open_repository(path: Option<&Path>) -> Result<Repository> {
    match path {
        Some(path) => Repository::open(path),
        None => Repository::discover(),
    }
}

/// `--config`, else `$GFLOW_CONFIG`, else the per-repository default.
///
/// An explicitly named file must exist; the default one is optional.
fn load_settings(repo: &Repository, explicit: Option<&Path>) -> Result<Settings> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(SETTINGS_PATH_ENV).map(PathBuf::from));
    match named {
        Some(path) => Settings::load(path),
        None => Settings::load_or_default(repo.settings_path()),
    }
}
