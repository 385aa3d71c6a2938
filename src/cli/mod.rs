//! CLI argument parsing for gflow.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gflow: the gitflow branching workflow on top of git.
///
/// Two long-lived branches (production and development) plus short-lived
/// feature, bugfix, release and hotfix branches, each started from and
/// finished into fixed places. Releases and hotfixes are tagged.
#[derive(Parser, Debug)]
#[command(name = "gflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run as if gflow was started in PATH.
    #[arg(short = 'C', value_name = "PATH", global = true)]
    pub repo: Option<PathBuf>,

    /// Settings file (default: $GFLOW_CONFIG, then <git-dir>/gflow/config.yaml).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Take the first option of every confirmation and the default of every prompt.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for gflow.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Initialize gitflow in the repository.
    ///
    /// Chooses the production and development branches and the branch
    /// prefixes, creating the development branch if needed.
    Init(InitArgs),

    /// Feature branches (from and into development).
    Feature(TopicCommand),

    /// Bugfix branches (from and into development).
    Bugfix(TopicCommand),

    /// Release branches (from development, into production and development, tagged).
    Release(VersionedCommand),

    /// Hotfix branches (from production, into production and development, tagged).
    Hotfix(VersionedCommand),

    /// Show the flow configuration, the current branch and any pending finish.
    Status,
}

/// Arguments for the `init` command.
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Accept every default without prompting.
    #[arg(short, long)]
    pub defaults: bool,
}

/// Feature/bugfix subcommands.
#[derive(Parser, Debug, Clone)]
pub struct TopicCommand {
    #[command(subcommand)]
    pub action: TopicAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TopicAction {
    /// Create a branch from development and check it out.
    Start(StartArgs),

    /// Merge the branch into development and delete it.
    ///
    /// Run it again after resolving a merge conflict to complete the finish.
    Finish(FinishArgs),

    /// Rebase the checked-out branch onto development.
    Rebase,

    /// List branches of this kind.
    List,
}

/// Release/hotfix subcommands.
#[derive(Parser, Debug, Clone)]
pub struct VersionedCommand {
    #[command(subcommand)]
    pub action: VersionedAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum VersionedAction {
    /// Create the branch and check it out.
    ///
    /// Without VERSION, the next version is suggested from the latest tag.
    Start(VersionStartArgs),

    /// Merge into production, tag, merge into development, and delete the branch.
    ///
    /// Run it again after resolving a merge conflict to complete the finish.
    Finish(VersionFinishArgs),

    /// List branches of this kind.
    List,
}

/// Arguments for `feature start` / `bugfix start`.
#[derive(Parser, Debug, Clone)]
pub struct StartArgs {
    /// Branch name, without the prefix (e.g. `login`).
    pub name: String,
}

/// Arguments for `feature finish` / `bugfix finish`.
#[derive(Parser, Debug, Clone)]
pub struct FinishArgs {
    /// Branch to finish. If omitted, uses the checked-out branch.
    pub name: Option<String>,
}

/// Arguments for `release start` / `hotfix start`.
#[derive(Parser, Debug, Clone)]
pub struct VersionStartArgs {
    /// Version to release (e.g. `1.2.0`).
    #[arg(id = "release_version", value_name = "VERSION")]
    pub version: Option<String>,
}

/// Arguments for `release finish` / `hotfix finish`.
#[derive(Parser, Debug, Clone)]
pub struct VersionFinishArgs {
    /// Branch to finish. If omitted, uses the checked-out branch.
    pub name: Option<String>,

    /// Tag message (prompted for when omitted).
    #[arg(short, long)]
    pub message: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
