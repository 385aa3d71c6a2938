//! Finishing a branch: the resumable merge protocol.
//!
//! Finishing is an explicit state machine so an interrupted run can pick up
//! where it stopped. Feature and bugfix branches take the short path:
//!
//! ```text
//! CheckResumable -> CheckClean -> CheckRemoteSync -> Merge(Development)
//!     -> Cleanup -> Publish -> Done
//! ```
//!
//! Release and hotfix branches merge into production first and tag it:
//!
//! ```text
//! CheckResumable -> CheckClean -> CheckRemoteSync -> Merge(Production) -> Tag
//!     -> Merge(Development) -> Cleanup -> Publish -> Done
//! ```
//!
//! A conflicting merge writes the Recovery Marker with the merge target and
//! stops, leaving the repository mid-merge. Once the operator has committed
//! the resolution, the next finish sees the marker, confirms the subject is
//! merged into that target and resumes at the step after that merge.

#[cfg(test)]
mod tests;

use super::{Flow, not_on_kind, qualify};
use crate::error::{GflowError, Remedy, Result};
use crate::events::{Event, EventAction};
use crate::flow::{BranchKind, Role};
use crate::marker::RecoveryMarker;
use crate::prompt::PromptSpec;
use crate::refs::{BranchRef, TagRef, list_branches_with_prefix};
use crate::state;
use serde_json::json;

#[derive(Debug, Clone, Default)]
pub struct FinishOptions {
    /// Branch to finish (with or without its prefix); defaults to the current one.
    pub name: Option<String>,
    /// Tag message for releases and hotfixes; prompted for when absent.
    pub message: Option<String>,
}

/// What a completed finish did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishReport {
    pub subject: BranchRef,
    /// True when the run picked up after a resolved conflict.
    pub resumed: bool,
    /// Targets that now contain the subject, in merge order.
    pub merged_into: Vec<BranchRef>,
    pub tag: Option<TagRef>,
}

/// Long-lived branch a merge step targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Production,
    Development,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishState {
    CheckResumable,
    CheckClean,
    CheckRemoteSync,
    Merge(Target),
    Tag,
    Cleanup,
    Publish,
    Done,
}

/// Finish a branch of `kind`.
pub fn finish(flow: &Flow<'_>, kind: BranchKind, options: FinishOptions) -> Result<FinishReport> {
    if kind == BranchKind::Support {
        return Err(GflowError::UserError(
            "support branches are long-lived and are not finished".to_string(),
        ));
    }

    let mut machine = Finish::prepare(flow, kind, options)?;
    let mut state = FinishState::CheckResumable;
    while state != FinishState::Done {
        tracing::debug!(?state, subject = %machine.subject, "finish step");
        state = machine.step(state)?;
    }

    let report = machine.into_report();
    let merged: Vec<&str> = report.merged_into.iter().map(BranchRef::name).collect();
    flow.audit(
        Event::new(EventAction::Finish)
            .with_branch(report.subject.name())
            .with_details(json!({
                "kind": kind.as_str(),
                "merged_into": merged,
                "tag": report.tag.as_ref().map(TagRef::name),
                "resumed": report.resumed,
            })),
    );

    let mut summary = format!(
        "Finished {} branch '{}': merged into {}",
        kind,
        report.subject,
        merged.join(" and ")
    );
    if let Some(tag) = &report.tag {
        summary.push_str(&format!(", tagged '{}'", tag));
    }
    summary.push_str(", branch deleted.");
    flow.prompter.notify(&summary);

    Ok(report)
}

struct Finish<'f, 'a> {
    flow: &'f Flow<'a>,
    kind: BranchKind,
    subject: BranchRef,
    production: BranchRef,
    development: BranchRef,
    prefix: String,
    tag_prefix: String,
    message: Option<String>,
    marker: RecoveryMarker,
    /// Target recorded by an interrupted run.
    pending: Option<BranchRef>,
    resumed: bool,
    merged_into: Vec<BranchRef>,
    tag: Option<TagRef>,
}

impl<'f, 'a> Finish<'f, 'a> {
    fn prepare(flow: &'f Flow<'a>, kind: BranchKind, options: FinishOptions) -> Result<Self> {
        let config = flow.config();
        config.require_flow_enabled()?;
        let prefix = config.prefix(kind)?;
        let production = config.production()?;
        let development = config.development()?;
        let tag_prefix = config.version_tag_prefix()?;

        let marker = RecoveryMarker::new(flow.repo);
        let pending = marker.read()?.map(BranchRef::new);
        // A marker naming another kind's target is not ours to resume.
        let own_target = pending.as_ref().filter(|target| {
            **target == development || (kind.is_versioned() && **target == production)
        });
        let subject = resolve_subject(flow, kind, &prefix, options.name.as_deref(), own_target)?;

        Ok(Self {
            flow,
            kind,
            subject,
            production,
            development,
            prefix,
            tag_prefix,
            message: options.message,
            marker,
            pending,
            resumed: false,
            merged_into: Vec::new(),
            tag: None,
        })
    }

    /// Perform one state's work and return the next state.
    fn step(&mut self, state: FinishState) -> Result<FinishState> {
        match state {
            FinishState::CheckResumable => self.check_resumable(),
            FinishState::CheckClean => {
                state::require_clean(self.flow.repo)?;
                Ok(FinishState::CheckRemoteSync)
            }
            FinishState::CheckRemoteSync => self.check_remote_sync(),
            FinishState::Merge(target) => self.merge(target),
            FinishState::Tag => self.create_tag(),
            FinishState::Cleanup => self.cleanup(),
            FinishState::Publish => self.publish(),
            FinishState::Done => Ok(FinishState::Done),
        }
    }

    fn branch_for(&self, target: Target) -> &BranchRef {
        match target {
            Target::Production => &self.production,
            Target::Development => &self.development,
        }
    }

    fn first_target(&self) -> Target {
        if self.kind.is_versioned() {
            Target::Production
        } else {
            Target::Development
        }
    }

    fn after_merge(&self, target: Target) -> FinishState {
        match target {
            Target::Production => FinishState::Tag,
            Target::Development => FinishState::Cleanup,
        }
    }

    fn target_named(&self, branch: &BranchRef) -> Option<Target> {
        if *branch == self.development {
            Some(Target::Development)
        } else if self.kind.is_versioned() && *branch == self.production {
            Some(Target::Production)
        } else {
            None
        }
    }

    // ========================================================================
    // States
    // ========================================================================

    fn check_resumable(&mut self) -> Result<FinishState> {
        let Some(pending) = self.pending.clone() else {
            return Ok(FinishState::CheckClean);
        };

        if !state::is_clean(self.flow.repo)? {
            return Err(GflowError::precondition(format!(
                "there are unresolved merge conflicts from finishing into '{}'.\n\n\
                 Resolve them and commit the merge before finishing.",
                pending
            )));
        }

        let Some(target) = self.target_named(&pending) else {
            tracing::debug!(target = %pending, kind = %self.kind, "recovery marker belongs to another kind");
            self.pending = None;
            return Ok(FinishState::CheckClean);
        };

        if state::is_merged(self.flow.repo, &self.subject, &pending)? {
            tracing::info!(subject = %self.subject, target = %pending, "resuming finish");
            self.resumed = true;
            if target == Target::Development && self.kind.is_versioned() {
                self.record_earlier_steps()?;
            }
            self.merged_into.push(pending.clone());
            self.flow.audit(
                Event::new(EventAction::Resume)
                    .with_branch(self.subject.name())
                    .with_details(json!({ "target": pending.name() })),
            );
            return Ok(self.after_merge(target));
        }

        self.pending = None;
        if self.marker_owned_elsewhere(&pending)? {
            tracing::debug!(target = %pending, kind = %self.kind, "recovery marker left by another kind");
        } else {
            tracing::warn!(target = %pending, subject = %self.subject, "discarding stale recovery marker");
            self.marker.clear()?;
        }
        Ok(FinishState::CheckClean)
    }

    fn check_remote_sync(&mut self) -> Result<FinishState> {
        let repo = self.flow.repo;
        let remote = self.flow.remote();

        state::require_in_sync(repo, &self.subject, &remote)?;
        state::require_in_sync(repo, &self.development, &remote)?;
        if self.kind.is_versioned() {
            state::require_in_sync(repo, &self.production, &remote)?;

            // Last chance to cancel: nothing has been merged yet.
            if self.message.is_none() && !self.tag_ref().exists(repo)? {
                let message = self
                    .flow
                    .prompter
                    .prompt(&self.tag_message_spec())
                    .filter(|answer| !answer.trim().is_empty())
                    .ok_or(GflowError::Cancelled)?;
                self.message = Some(message);
            }
        }

        Ok(FinishState::Merge(self.first_target()))
    }

    fn merge(&mut self, target: Target) -> Result<FinishState> {
        let repo = self.flow.repo;
        let branch = self.branch_for(target).clone();

        if state::is_merged(repo, &self.subject, &branch)? {
            tracing::debug!(subject = %self.subject, target = %branch, "already merged");
            self.merged_into.push(branch);
            return Ok(self.after_merge(target));
        }

        self.flow.checkout(&branch)?;
        self.flow
            .prompter
            .progress(&format!("Merging '{}' into '{}'", self.subject, branch));

        let output = repo.run(&["merge", "--no-ff", "--no-edit", self.subject.name()])?;
        if !output.success() {
            self.marker.write(branch.name())?;
            self.flow.audit(
                Event::new(EventAction::Conflict)
                    .with_branch(self.subject.name())
                    .with_details(json!({ "target": branch.name(), "detail": output.message() })),
            );
            return Err(GflowError::Conflict {
                branch: self.subject.name().to_string(),
                target: branch.name().to_string(),
            });
        }

        self.merged_into.push(branch);
        Ok(self.after_merge(target))
    }

    fn create_tag(&mut self) -> Result<FinishState> {
        let tag = self.tag_ref();
        if tag.exists(self.flow.repo)? {
            tracing::debug!(tag = %tag, "tag already exists");
        } else {
            // Past the first merge there is no cancelling; a blank answer takes the default.
            let message = match self.message.clone() {
                Some(message) => message,
                None => {
                    let spec = self.tag_message_spec();
                    self.flow
                        .prompter
                        .prompt(&spec)
                        .filter(|answer| !answer.trim().is_empty())
                        .or(spec.default)
                        .unwrap_or_default()
                }
            };
            self.flow.repo.run_required(&[
                "tag",
                "-a",
                tag.name(),
                "-m",
                &message,
                self.production.name(),
            ])?;
            tracing::info!(tag = %tag, "tag created");
        }

        self.tag = Some(tag);
        Ok(FinishState::Merge(Target::Development))
    }

    fn cleanup(&mut self) -> Result<FinishState> {
        self.flow.checkout(&self.development)?;
        self.flow
            .repo
            .run_required(&["branch", "-d", self.subject.name()])?;
        // A marker owned by another kind stays for that kind's finish.
        if self.pending.take().is_some() {
            self.marker.clear()?;
        }
        Ok(FinishState::Publish)
    }

    fn publish(&mut self) -> Result<FinishState> {
        let repo = self.flow.repo;
        let remote = self.flow.remote();
        if !self.flow.settings.delete_remote_branches || !remote.exists(repo)? {
            return Ok(FinishState::Done);
        }

        if self.kind.is_versioned() {
            self.flow
                .prompter
                .progress(&format!("Pushing to '{}'", remote));
            repo.run_required(&["push", remote.name(), self.production.name()])?;
            repo.run_required(&["push", remote.name(), self.development.name()])?;
            repo.run_required(&["push", "--tags", remote.name()])?;
        }

        let published = self.subject.remote_at(&remote);
        if published.exists(repo)? {
            let output = repo.run(&["push", remote.name(), "--delete", self.subject.name()])?;
            if !output.success() {
                tracing::warn!(branch = %published, stderr = %output.stderr, "failed to delete remote branch");
            }
        }
        Ok(FinishState::Done)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// A release or hotfix resumed at development already went through the
    /// production merge and the tag.
    fn record_earlier_steps(&mut self) -> Result<()> {
        let repo = self.flow.repo;
        if state::is_merged(repo, &self.subject, &self.production)? {
            self.merged_into.push(self.production.clone());
        }
        let tag = self.tag_ref();
        if tag.exists(repo)? {
            self.tag = Some(tag);
        }
        Ok(())
    }

    /// Whether a branch of another kind that also merges into `target` is
    /// already merged there, i.e. the marker was left by that kind's finish.
    fn marker_owned_elsewhere(&self, target: &BranchRef) -> Result<bool> {
        let repo = self.flow.repo;
        let config = self.flow.config();
        for kind in BranchKind::ALL {
            if kind == self.kind || kind == BranchKind::Support {
                continue;
            }
            if *target == self.production && !kind.is_versioned() {
                continue;
            }
            let Some(prefix) = config
                .get(Role::Prefix(kind))?
                .filter(|prefix| !prefix.is_empty())
            else {
                continue;
            };
            for candidate in list_branches_with_prefix(repo, &prefix)? {
                if state::is_merged(repo, &candidate, target)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// `{tag prefix}{subject without its kind prefix}`.
    fn tag_ref(&self) -> TagRef {
        let version = self
            .subject
            .strip_prefix(&self.prefix)
            .unwrap_or(self.subject.name());
        TagRef::new(format!("{}{}", self.tag_prefix, version))
    }

    fn tag_message_spec(&self) -> PromptSpec {
        let version = self
            .subject
            .strip_prefix(&self.prefix)
            .unwrap_or(self.subject.name());
        let label = match self.kind {
            BranchKind::Hotfix => "Hotfix",
            _ => "Release",
        };
        PromptSpec::new(format!("Message for tag '{}'", self.tag_ref()))
            .with_default(format!("{} {}", label, version))
    }

    fn into_report(self) -> FinishReport {
        FinishReport {
            subject: self.subject,
            resumed: self.resumed,
            merged_into: self.merged_into,
            tag: self.tag,
        }
    }
}

/// Work out which branch to finish.
///
/// In order: the named branch; the checked-out branch when it carries the
/// prefix; with a pending marker, the branch of this kind left behind by the
/// interrupted run.
fn resolve_subject(
    flow: &Flow<'_>,
    kind: BranchKind,
    prefix: &str,
    name: Option<&str>,
    pending: Option<&BranchRef>,
) -> Result<BranchRef> {
    let repo = flow.repo;
    let current = state::current_branch(repo)?;

    if let Some(name) = name {
        let subject = BranchRef::new(qualify(prefix, name));
        if !list_branches_with_prefix(repo, prefix)?.contains(&subject) {
            return Err(GflowError::UserError(format!(
                "there is no {} branch named '{}'",
                kind, subject
            )));
        }
        // While a merge is pending the target is checked out, not the subject.
        if pending.is_none() && current.as_ref() != Some(&subject) {
            return Err(GflowError::with_remedy(
                format!(
                    "'{}' is not checked out.\n\n\
                     Finishing works on the checked-out branch.",
                    subject
                ),
                Remedy::checkout(subject.name()),
            ));
        }
        return Ok(subject);
    }

    if let Some(current) = current
        && current.name().starts_with(prefix)
    {
        return Ok(current);
    }

    if let Some(target) = pending {
        let candidates = list_branches_with_prefix(repo, prefix)?;
        if let [only] = candidates.as_slice() {
            return Ok(only.clone());
        }
        let mut merged = Vec::new();
        for candidate in candidates {
            if state::is_merged(repo, &candidate, target)? {
                merged.push(candidate);
            }
        }
        if merged.len() > 1 {
            // An untouched branch is "merged" too; the subject is the one the
            // resolution commit on the target merged in.
            let parents = merge_parents(flow, target)?;
            let mut merged_in = Vec::new();
            for candidate in merged {
                if parents.contains(&candidate.revision(repo)?) {
                    merged_in.push(candidate);
                }
            }
            merged = merged_in;
        }
        if merged.len() == 1 {
            return Ok(merged.remove(0));
        }
    }

    Err(not_on_kind(repo, kind, prefix)?)
}

/// Parents of `branch`'s tip other than the first (empty unless it is a merge).
fn merge_parents(flow: &Flow<'_>, branch: &BranchRef) -> Result<Vec<String>> {
    let output = flow
        .repo
        .run_required(&["rev-list", "--parents", "-n", "1", branch.name()])?;
    Ok(output
        .stdout
        .split_whitespace()
        .skip(2)
        .map(str::to_string)
        .collect())
}
