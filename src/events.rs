//! Audit log of workflow operations.
//!
//! Every completed (or interrupted) workflow step is appended as one JSON
//! object per line to `<git-dir>/gflow/events.ndjson`:
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: init, start, finish, rebase, conflict, resume
//! - `actor`: `user@HOST`
//! - `branch`: the branch the operation was about, when there is one
//! - `details`: freeform object with action-specific details
//!
//! The log is local to the clone and never committed. Writing it is
//! best-effort from the engine's point of view: a failed append is logged
//! and the git operation it describes stands.

use crate::context::Repository;
use crate::error::{GflowError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Repository initialized for gitflow
    Init,
    /// Branch of some kind started
    Start,
    /// Branch finished and deleted
    Finish,
    /// Feature/bugfix rebased onto development
    Rebase,
    /// Finish merge stopped on conflicts
    Conflict,
    /// Finish resumed after conflicts were resolved
    Resume,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventAction::Init => "init",
            EventAction::Start => "start",
            EventAction::Finish => "finish",
            EventAction::Rebase => "rebase",
            EventAction::Conflict => "conflict",
            EventAction::Resume => "resume",
        };
        f.write_str(name)
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    pub action: EventAction,
    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    pub details: Value,
}

impl Event {
    /// New event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            branch: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| GflowError::UserError(format!("failed to serialize event to JSON: {}", e)))
    }
}

fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append `event` to the repository's audit log, creating it if needed.
pub fn append_event(repo: &Repository, event: &Event) -> Result<()> {
    let events_file = repo.events_file();
    let json_line = event.to_ndjson_line()?;

    let state_dir = repo.state_dir();
    if !state_dir.exists() {
        fs::create_dir_all(&state_dir).map_err(|e| {
            GflowError::UserError(format!(
                "failed to create state directory '{}': {}",
                state_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            GflowError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        GflowError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read all events from the audit log, oldest first. Unparseable lines are skipped.
pub fn read_events(repo: &Repository) -> Result<Vec<Event>> {
    let events_file = repo.events_file();
    if !events_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&events_file).map_err(|e| {
        GflowError::UserError(format!(
            "failed to read events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<Event>(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed audit log line");
                None
            }
        })
        .collect())
}
