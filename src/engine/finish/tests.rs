//! Tests for the finish state machine.

use super::*;
use crate::config::Settings;
use crate::context::Repository;
use crate::error::RemedyAction;
use crate::git::GitOutput;
use crate::test_support::{
    CallLog, ScriptedGit, ScriptedPrompter, commit_file, create_flow_repo,
    create_flow_repo_with_origin, create_test_repo, git,
};
use std::path::Path;
use tempfile::TempDir;

/// `feature/login` with one commit, checked out.
fn repo_with_feature() -> TempDir {
    let temp_dir = create_flow_repo();
    let path = temp_dir.path();
    git(path, &["checkout", "--quiet", "-b", "feature/login"]);
    commit_file(path, "login.txt", "login\n", "Add login");
    temp_dir
}

/// `release/1.0.0` whose merge into `master` conflicts, checked out.
fn repo_with_conflicting_release() -> TempDir {
    let temp_dir = create_flow_repo();
    let path = temp_dir.path();
    git(path, &["checkout", "--quiet", "-b", "release/1.0.0"]);
    commit_file(path, "version.txt", "1.0.0\n", "Bump version");
    git(path, &["checkout", "--quiet", "master"]);
    commit_file(path, "version.txt", "0.9.1\n", "Patch on master");
    git(path, &["checkout", "--quiet", "release/1.0.0"]);
    temp_dir
}

/// `release/1.0.0` that merges cleanly into `master` but conflicts with
/// `develop`, checked out.
fn repo_with_release_conflicting_on_develop() -> TempDir {
    let temp_dir = create_flow_repo();
    let path = temp_dir.path();
    git(path, &["checkout", "--quiet", "-b", "release/1.0.0"]);
    commit_file(path, "version.txt", "1.0.0\n", "Bump version");
    git(path, &["checkout", "--quiet", "develop"]);
    commit_file(path, "version.txt", "1.1.0-dev\n", "Start next cycle");
    git(path, &["checkout", "--quiet", "release/1.0.0"]);
    temp_dir
}

/// Commit the conflicted merge with `version.txt` set to `contents`.
fn resolve_version_conflict(path: &Path, contents: &str) {
    std::fs::write(path.join("version.txt"), contents).unwrap();
    git(path, &["add", "version.txt"]);
    git(path, &["commit", "--quiet", "--no-edit"]);
}

fn branch_exists(path: &Path, name: &str) -> bool {
    !git(path, &["branch", "--list", name]).is_empty()
}

// ============================================================================
// Feature / bugfix
// ============================================================================

#[test]
fn test_feature_finish_merges_and_deletes() {
    let temp_dir = repo_with_feature();
    let path = temp_dir.path();
    let feature_tip = git(path, &["rev-parse", "feature/login"]);

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let report = finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap();

    assert_eq!(report.subject, BranchRef::new("feature/login"));
    assert!(!report.resumed);
    assert_eq!(report.merged_into, vec![BranchRef::new("develop")]);
    assert!(report.tag.is_none());

    // A merge commit was created even though a fast-forward was possible
    assert_eq!(git(path, &["rev-parse", "develop^2"]), feature_tip);
    assert!(!branch_exists(path, "feature/login"));
    assert_eq!(git(path, &["rev-parse", "--abbrev-ref", "HEAD"]), "develop");
    assert!(!repo.marker_path().exists());
    assert!(prompter.notifications.borrow()[0].contains("merged into develop"));
}

#[test]
fn test_finish_named_branch_not_checked_out_offers_checkout() {
    let temp_dir = repo_with_feature();
    git(temp_dir.path(), &["checkout", "--quiet", "develop"]);

    let repo = Repository::open(temp_dir.path()).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let options = FinishOptions {
        name: Some("login".to_string()),
        ..FinishOptions::default()
    };
    let err = finish(&flow, BranchKind::Feature, options).unwrap_err();
    assert_eq!(
        err.remedy().map(|r| &r.action),
        Some(&RemedyAction::Checkout {
            branch: "feature/login".to_string()
        })
    );
    assert!(branch_exists(temp_dir.path(), "feature/login"));
}

#[test]
fn test_finish_unknown_name_fails() {
    let temp_dir = repo_with_feature();
    let repo = Repository::open(temp_dir.path()).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let options = FinishOptions {
        name: Some("nope".to_string()),
        ..FinishOptions::default()
    };
    let err = finish(&flow, BranchKind::Feature, options).unwrap_err();
    assert!(matches!(err, GflowError::UserError(_)));
}

#[test]
fn test_finish_refuses_dirty_tree() {
    let temp_dir = repo_with_feature();
    std::fs::write(temp_dir.path().join("login.txt"), "edited\n").unwrap();

    let repo = Repository::open(temp_dir.path()).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let err = finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap_err();
    assert!(err.to_string().contains("uncommitted changes"));
    assert!(branch_exists(temp_dir.path(), "feature/login"));
}

#[test]
fn test_finish_requires_flow_enabled() {
    let temp_dir = create_test_repo();
    let repo = Repository::open(temp_dir.path()).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let err = finish(&flow, BranchKind::Bugfix, FinishOptions::default()).unwrap_err();
    assert_eq!(
        err.remedy().map(|r| &r.action),
        Some(&RemedyAction::Initialize)
    );
}

#[test]
fn test_support_branches_are_not_finished() {
    let temp_dir = create_flow_repo();
    let repo = Repository::open(temp_dir.path()).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    assert!(finish(&flow, BranchKind::Support, FinishOptions::default()).is_err());
}

#[test]
fn test_stale_marker_is_discarded() {
    let temp_dir = repo_with_feature();
    let repo = Repository::open(temp_dir.path()).unwrap();
    RecoveryMarker::new(&repo).write("develop").unwrap();

    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let report = finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap();
    assert!(!report.resumed);
    assert_eq!(report.merged_into, vec![BranchRef::new("develop")]);
    assert!(!repo.marker_path().exists());
}

#[test]
fn test_diverged_subject_offers_pull() {
    let (work, _origin) = create_flow_repo_with_origin();
    let path = work.path();
    git(path, &["checkout", "--quiet", "-b", "feature/login"]);
    commit_file(path, "login.txt", "login\n", "Add login");
    git(path, &["push", "--quiet", "origin", "feature/login"]);
    commit_file(path, "login.txt", "login v2\n", "Unpushed");

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let err = finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap_err();
    assert_eq!(
        err.remedy().map(|r| &r.action),
        Some(&RemedyAction::Pull {
            remote: "origin".to_string(),
            branch: "feature/login".to_string()
        })
    );
    assert_eq!(git(path, &["rev-list", "--count", "develop"]), "1");
}

#[test]
fn test_remote_branch_kept_when_deletion_disabled() {
    let (work, _origin) = create_flow_repo_with_origin();
    let path = work.path();
    git(path, &["checkout", "--quiet", "-b", "feature/login"]);
    commit_file(path, "login.txt", "login\n", "Add login");
    git(path, &["push", "--quiet", "origin", "feature/login"]);

    let repo = Repository::open(path).unwrap();
    let settings = Settings::from_yaml("delete_remote_branches: false\n").unwrap();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap();

    assert!(!branch_exists(path, "feature/login"));
    assert!(!git(path, &["ls-remote", "--heads", "origin", "feature/login"]).is_empty());
}

// ============================================================================
// Release / hotfix
// ============================================================================

#[test]
fn test_release_finish_tags_and_publishes() {
    let (work, origin) = create_flow_repo_with_origin();
    let path = work.path();
    git(path, &["config", "gitflow.prefix.versiontag", "v"]);
    git(path, &["checkout", "--quiet", "-b", "release/1.0.0"]);
    commit_file(path, "version.txt", "1.0.0\n", "Bump version");
    git(path, &["push", "--quiet", "origin", "release/1.0.0"]);

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let options = FinishOptions {
        message: Some("First release".to_string()),
        ..FinishOptions::default()
    };
    let report = finish(&flow, BranchKind::Release, options).unwrap();

    assert_eq!(
        report.merged_into,
        vec![BranchRef::new("master"), BranchRef::new("develop")]
    );
    assert_eq!(report.tag, Some(TagRef::new("v1.0.0")));
    assert!(prompter.prompts.borrow().is_empty());

    assert_eq!(
        git(
            path,
            &["for-each-ref", "refs/tags/v1.0.0", "--format=%(contents:subject)"]
        ),
        "First release"
    );
    assert_eq!(git(path, &["rev-parse", "v1.0.0^{commit}"]), git(path, &["rev-parse", "master"]));
    assert!(!branch_exists(path, "release/1.0.0"));

    // Published: long-lived branches and tags pushed, release branch removed
    let origin = origin.path();
    assert_eq!(git(origin, &["rev-parse", "master"]), git(path, &["rev-parse", "master"]));
    assert_eq!(git(origin, &["rev-parse", "develop"]), git(path, &["rev-parse", "develop"]));
    assert_eq!(git(origin, &["tag", "--list"]), "v1.0.0");
    assert!(git(origin, &["branch", "--list", "release/1.0.0"]).is_empty());
}

#[test]
fn test_hotfix_tag_message_defaults_from_prompt() {
    let temp_dir = create_flow_repo();
    let path = temp_dir.path();
    git(path, &["checkout", "--quiet", "-b", "hotfix/1.0.1", "master"]);
    commit_file(path, "fix.txt", "fix\n", "Fix");

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let report = finish(&flow, BranchKind::Hotfix, FinishOptions::default()).unwrap();

    assert_eq!(report.tag, Some(TagRef::new("1.0.1")));
    assert_eq!(
        prompter.prompts.borrow()[0].default.as_deref(),
        Some("Hotfix 1.0.1")
    );
    assert_eq!(
        git(
            path,
            &["for-each-ref", "refs/tags/1.0.1", "--format=%(contents:subject)"]
        ),
        "Hotfix 1.0.1"
    );
    // The fix reached development too
    assert_eq!(git(path, &["show", "develop:fix.txt"]), "fix");
}

#[test]
fn test_cancelled_tag_message_changes_nothing() {
    let temp_dir = create_flow_repo();
    let path = temp_dir.path();
    git(path, &["checkout", "--quiet", "-b", "release/2.0.0"]);
    commit_file(path, "version.txt", "2.0.0\n", "Bump version");
    let master_before = git(path, &["rev-parse", "master"]);

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new().answer(None);
    let flow = Flow::new(&repo, &settings, &prompter);

    let err = finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap_err();
    assert!(matches!(err, GflowError::Cancelled));
    assert_eq!(git(path, &["rev-parse", "master"]), master_before);
    assert!(branch_exists(path, "release/2.0.0"));
    assert!(git(path, &["tag", "--list"]).is_empty());
}

#[test]
fn test_release_conflict_writes_marker() {
    let temp_dir = repo_with_conflicting_release();
    let path = temp_dir.path();

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let err = finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap_err();
    match &err {
        GflowError::Conflict { branch, target } => {
            assert_eq!(branch, "release/1.0.0");
            assert_eq!(target, "master");
        }
        other => panic!("expected Conflict, got {:?}", other),
    }
    assert_eq!(err.exit_code(), crate::exit_codes::CONFLICT);

    assert_eq!(
        RecoveryMarker::new(&repo).read().unwrap(),
        Some("master".to_string())
    );
    assert!(branch_exists(path, "release/1.0.0"));
    let release = BranchRef::new("release/1.0.0");
    assert!(!state::is_merged(&repo, &release, &BranchRef::new("develop")).unwrap());
    assert!(!state::is_clean(&repo).unwrap());

    // Re-running before the conflict is resolved is refused
    let err = finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap_err();
    assert!(err.to_string().contains("unresolved merge conflicts"));
    assert!(repo.marker_path().exists());
}

#[test]
fn test_release_resumes_after_resolution() {
    let temp_dir = repo_with_conflicting_release();
    let path = temp_dir.path();

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);
    finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap_err();

    // Resolve by hand on master
    std::fs::write(path.join("version.txt"), "1.0.0\n").unwrap();
    git(path, &["add", "version.txt"]);
    git(path, &["commit", "--quiet", "--no-edit"]);

    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);
    let report = finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap();

    assert!(report.resumed);
    assert_eq!(report.subject, BranchRef::new("release/1.0.0"));
    assert_eq!(
        report.merged_into,
        vec![BranchRef::new("master"), BranchRef::new("develop")]
    );
    assert_eq!(report.tag, Some(TagRef::new("1.0.0")));
    assert_eq!(git(path, &["cat-file", "-t", "1.0.0"]), "tag");
    assert_eq!(git(path, &["show", "develop:version.txt"]), "1.0.0");
    assert!(!branch_exists(path, "release/1.0.0"));
    assert!(!repo.marker_path().exists());
}

#[test]
fn test_resume_on_develop_reports_production_merge_and_tag() {
    let temp_dir = repo_with_release_conflicting_on_develop();
    let path = temp_dir.path();

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);
    let err = finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap_err();
    assert!(matches!(err, GflowError::Conflict { ref target, .. } if target == "develop"));
    assert_eq!(git(path, &["cat-file", "-t", "1.0.0"]), "tag");

    resolve_version_conflict(path, "1.0.0\n");

    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);
    let report = finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap();

    assert!(report.resumed);
    assert_eq!(
        report.merged_into,
        vec![BranchRef::new("master"), BranchRef::new("develop")]
    );
    assert_eq!(report.tag, Some(TagRef::new("1.0.0")));
    let notice = prompter.notifications.borrow().last().cloned().unwrap();
    assert!(notice.contains("merged into master and develop, tagged '1.0.0'"));
    assert!(!repo.marker_path().exists());
}

#[test]
fn test_feature_finish_leaves_release_marker_on_production() {
    let temp_dir = repo_with_conflicting_release();
    let path = temp_dir.path();

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);
    finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap_err();
    resolve_version_conflict(path, "1.0.0\n");

    git(path, &["checkout", "--quiet", "-b", "feature/other", "develop"]);
    commit_file(path, "other.txt", "other\n", "Add other");
    finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap();

    let marker = RecoveryMarker::new(&repo);
    assert_eq!(marker.read().unwrap(), Some("master".to_string()));

    git(path, &["checkout", "--quiet", "master"]);
    let report = finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap();
    assert!(report.resumed);
    assert_eq!(report.subject, BranchRef::new("release/1.0.0"));
    assert_eq!(report.tag, Some(TagRef::new("1.0.0")));
    assert_eq!(marker.read().unwrap(), None);
}

#[test]
fn test_feature_finish_leaves_release_marker_on_develop() {
    let temp_dir = repo_with_release_conflicting_on_develop();
    let path = temp_dir.path();

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);
    finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap_err();
    resolve_version_conflict(path, "1.0.0\n");

    git(path, &["checkout", "--quiet", "-b", "feature/other", "develop"]);
    commit_file(path, "other.txt", "other\n", "Add other");
    let report = finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap();
    assert!(!report.resumed);

    let marker = RecoveryMarker::new(&repo);
    assert_eq!(marker.read().unwrap(), Some("develop".to_string()));

    let report = finish(&flow, BranchKind::Release, FinishOptions::default()).unwrap();
    assert!(report.resumed);
    assert_eq!(report.subject, BranchRef::new("release/1.0.0"));
    assert_eq!(marker.read().unwrap(), None);
}

#[test]
fn test_resume_picks_branch_merged_by_resolution_commit() {
    let temp_dir = create_flow_repo();
    let path = temp_dir.path();
    git(path, &["checkout", "--quiet", "-b", "feature/login"]);
    commit_file(path, "login.txt", "login\n", "Add login");
    git(path, &["checkout", "--quiet", "develop"]);
    commit_file(path, "login.txt", "placeholder\n", "Add placeholder");
    git(path, &["checkout", "--quiet", "feature/login"]);

    let repo = Repository::open(path).unwrap();
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);
    finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap_err();

    std::fs::write(path.join("login.txt"), "login\n").unwrap();
    git(path, &["add", "login.txt"]);
    git(path, &["commit", "--quiet", "--no-edit"]);
    // Started after the resolution: contained in develop without being merged in
    git(path, &["branch", "feature/fresh", "develop"]);

    let report = finish(&flow, BranchKind::Feature, FinishOptions::default()).unwrap();
    assert!(report.resumed);
    assert_eq!(report.subject, BranchRef::new("feature/login"));
    assert!(branch_exists(path, "feature/fresh"));
    assert!(!branch_exists(path, "feature/login"));
}

// ============================================================================
// State by state, scripted
// ============================================================================

fn machine<'f, 'a>(flow: &'f Flow<'a>, kind: BranchKind, subject: &str) -> Finish<'f, 'a> {
    Finish {
        flow,
        kind,
        subject: BranchRef::new(subject),
        production: BranchRef::new("master"),
        development: BranchRef::new("develop"),
        prefix: kind.default_prefix().to_string(),
        tag_prefix: String::new(),
        message: None,
        marker: RecoveryMarker::new(flow.repo),
        pending: None,
        resumed: false,
        merged_into: Vec::new(),
        tag: None,
    }
}

fn position(calls: &CallLog, call: &str) -> usize {
    calls
        .borrow()
        .iter()
        .position(|c| c == call)
        .unwrap_or_else(|| panic!("missing git call: {}", call))
}

#[test]
fn test_merge_conflict_step_writes_marker() {
    let git_dir = TempDir::new().unwrap();
    let scripted = ScriptedGit::new()
        .on(
            "branch --no-color --contains feature/login",
            GitOutput::ok("* feature/login"),
        )
        .on("branch --no-color -r --contains feature/login", GitOutput::ok(""))
        .on("symbolic-ref --quiet --short HEAD", GitOutput::ok("feature/login"))
        .on("checkout develop", GitOutput::ok(""))
        .on(
            "merge --no-ff --no-edit feature/login",
            GitOutput::failed(1, "CONFLICT (content): Merge conflict in login.txt"),
        );
    let calls = scripted.calls();
    let repo = scripted.into_repo(git_dir.path());
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let mut finish = machine(&flow, BranchKind::Feature, "feature/login");
    let err = finish
        .step(FinishState::Merge(Target::Development))
        .unwrap_err();

    assert!(matches!(err, GflowError::Conflict { .. }));
    assert_eq!(
        RecoveryMarker::new(&repo).read().unwrap(),
        Some("develop".to_string())
    );
    assert!(position(&calls, "checkout develop") < position(&calls, "merge --no-ff --no-edit feature/login"));
    assert!(finish.merged_into.is_empty());
}

#[test]
fn test_resume_step_skips_to_cleanup_without_merging() {
    let git_dir = TempDir::new().unwrap();
    let scripted = ScriptedGit::new()
        .on(
            "diff --no-ext-diff --ignore-submodules --quiet --exit-code",
            GitOutput::ok(""),
        )
        .on(
            "diff-index --cached --quiet --ignore-submodules HEAD --",
            GitOutput::ok(""),
        )
        .on(
            "branch --no-color --contains feature/login",
            GitOutput::ok("* develop\n  feature/login"),
        )
        .on("branch --no-color -r --contains feature/login", GitOutput::ok(""));
    let calls = scripted.calls();
    let repo = scripted.into_repo(git_dir.path());
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let mut finish = machine(&flow, BranchKind::Feature, "feature/login");
    finish.pending = Some(BranchRef::new("develop"));

    let next = finish.step(FinishState::CheckResumable).unwrap();

    assert_eq!(next, FinishState::Cleanup);
    assert!(finish.resumed);
    assert_eq!(finish.merged_into, vec![BranchRef::new("develop")]);
    assert!(!calls.borrow().iter().any(|c| c.starts_with("merge")));
}

#[test]
fn test_dirty_tree_with_marker_is_refused() {
    let git_dir = TempDir::new().unwrap();
    let scripted = ScriptedGit::new()
        .on(
            "diff --no-ext-diff --ignore-submodules --quiet --exit-code",
            GitOutput::failed(1, ""),
        )
        .on(
            "diff-index --cached --quiet --ignore-submodules HEAD --",
            GitOutput::failed(1, ""),
        );
    let repo = scripted.into_repo(git_dir.path());
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let mut finish = machine(&flow, BranchKind::Release, "release/1.0.0");
    finish.pending = Some(BranchRef::new("master"));

    let err = finish.step(FinishState::CheckResumable).unwrap_err();
    assert!(err.to_string().contains("unresolved merge conflicts"));
    assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
}

#[test]
fn test_resumed_release_continues_at_tag() {
    let git_dir = TempDir::new().unwrap();
    let scripted = ScriptedGit::new()
        .on(
            "diff --no-ext-diff --ignore-submodules --quiet --exit-code",
            GitOutput::ok(""),
        )
        .on(
            "diff-index --cached --quiet --ignore-submodules HEAD --",
            GitOutput::ok(""),
        )
        .on(
            "branch --no-color --contains release/1.0.0",
            GitOutput::ok("* master\n  release/1.0.0"),
        )
        .on("branch --no-color -r --contains release/1.0.0", GitOutput::ok(""));
    let repo = scripted.into_repo(git_dir.path());
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let mut finish = machine(&flow, BranchKind::Release, "release/1.0.0");
    finish.pending = Some(BranchRef::new("master"));

    assert_eq!(
        finish.step(FinishState::CheckResumable).unwrap(),
        FinishState::Tag
    );
}

#[test]
fn test_cleanup_and_publish_order() {
    let git_dir = TempDir::new().unwrap();
    let scripted = ScriptedGit::new()
        .on("symbolic-ref --quiet --short HEAD", GitOutput::ok("master"))
        .on("checkout develop", GitOutput::ok(""))
        .on("branch -d release/1.0.0", GitOutput::ok("Deleted branch release/1.0.0"))
        .on("remote", GitOutput::ok("origin"))
        .on("push origin master", GitOutput::ok(""))
        .on("push origin develop", GitOutput::ok(""))
        .on("push --tags origin", GitOutput::ok(""))
        .on("branch --no-color", GitOutput::ok("* develop\n  master"))
        .on(
            "branch --no-color -r",
            GitOutput::ok("  origin/develop\n  origin/master\n  origin/release/1.0.0"),
        )
        .on("push origin --delete release/1.0.0", GitOutput::ok(""));
    let calls = scripted.calls();
    let repo = scripted.into_repo(git_dir.path());
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let mut finish = machine(&flow, BranchKind::Release, "release/1.0.0");
    finish.pending = Some(BranchRef::new("master"));
    RecoveryMarker::new(&repo).write("master").unwrap();

    assert_eq!(finish.step(FinishState::Cleanup).unwrap(), FinishState::Publish);
    assert!(!repo.marker_path().exists());
    assert_eq!(finish.step(FinishState::Publish).unwrap(), FinishState::Done);

    let order = [
        "checkout develop",
        "branch -d release/1.0.0",
        "push origin master",
        "push origin develop",
        "push --tags origin",
        "push origin --delete release/1.0.0",
    ];
    for pair in order.windows(2) {
        assert!(
            position(&calls, pair[0]) < position(&calls, pair[1]),
            "{} should run before {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_failed_remote_delete_is_not_fatal() {
    let git_dir = TempDir::new().unwrap();
    let scripted = ScriptedGit::new()
        .on("remote", GitOutput::ok("origin"))
        .on("branch --no-color", GitOutput::ok("* develop"))
        .on("branch --no-color -r", GitOutput::ok("  origin/feature/login"))
        .on(
            "push origin --delete feature/login",
            GitOutput::failed(1, "remote: permission denied"),
        );
    let repo = scripted.into_repo(git_dir.path());
    let settings = Settings::default();
    let prompter = ScriptedPrompter::new();
    let flow = Flow::new(&repo, &settings, &prompter);

    let mut finish = machine(&flow, BranchKind::Feature, "feature/login");
    assert_eq!(finish.step(FinishState::Publish).unwrap(), FinishState::Done);
}
