//! Gflow: the gitflow branching workflow on top of git.
//!
//! This is the main entry point for the `gflow` CLI. It parses arguments,
//! sets up diagnostic logging, dispatches to the appropriate command handler,
//! and handles errors with proper exit codes.

mod cli;
mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod flow;
pub mod fs;
pub mod git;
pub mod marker;
pub mod prompt;
pub mod refs;
pub mod state;
pub mod version;

#[cfg(test)]
mod test_support;

use cli::Cli;
use prompt::TerminalPrompter;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let prompter = TerminalPrompter::new(cli.yes);
    match commands::dispatch(&cli, &prompter) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the `--verbose` level.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
