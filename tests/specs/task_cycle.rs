// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario A: happy-path task cycle in a single session.

use crate::prelude::*;

#[test]
fn full_cycle_from_create_to_validated() {
    let p = Project::empty();

    // Create session s (explicit id, no worktree: temp dir is not a repo).
    p.edison()
        .args(["session", "create", "--session-id", "s", "--no-worktree"])
        .assert()
        .success();
    assert!(p.exists(".project/sessions/active/s/session.json"));

    // Create task T-001 scoped to s: task todo, QA waiting.
    p.edison()
        .args([
            "task", "create", "t-001", "--title", "Fix login retry", "--session-id", "s",
        ])
        .assert()
        .success();
    assert!(p.exists(".project/sessions/active/s/tasks/todo/t-001.md"));
    assert!(p.exists(".project/sessions/active/s/qa/waiting/t-001-qa.md"));

    // Claim: task -> wip, QA unchanged, activity logged.
    p.edison().args(["task", "claim", "t-001"]).assert().success();
    assert!(p.exists(".project/sessions/active/s/tasks/wip/t-001.md"));
    assert!(p.exists(".project/sessions/active/s/qa/waiting/t-001-qa.md"));
    let session = p.read(".project/sessions/active/s/session.json");
    assert!(session.contains("activity_log") || session.contains("activityLog") || session.contains("t-001"));

    // Evidence for round 1.
    p.full_evidence("t-001");

    // Ready: task -> done, QA -> todo.
    p.edison().args(["task", "ready", "t-001"]).assert().success();
    assert!(p.exists(".project/sessions/active/s/tasks/done/t-001.md"));
    assert!(p.exists(".project/sessions/active/s/qa/todo/t-001-qa.md"));

    // Validator report lands (external agent wrote it).
    p.validator_report("t-001", 1, "global-codex", "approve");

    // Bundle: approved, passed == [global-codex].
    p.edison().args(["qa", "bundle", "t-001"]).assert().success();
    let bundle = p.read(".project/qa/validation-evidence/t-001/round-1/bundle-approved.json");
    let bundle: serde_json::Value = serde_json::from_str(&bundle).unwrap();
    assert_eq!(bundle["approved"], serde_json::json!(true));
    assert_eq!(bundle["passed"], serde_json::json!(["global-codex"]));
    assert_eq!(bundle["failed"], serde_json::json!([]));

    // Validate --execute: QA -> done, task -> validated, QA -> validated.
    p.edison()
        .args(["qa", "validate", "t-001", "--execute"])
        .assert()
        .success();
    assert!(p.exists(".project/sessions/active/s/tasks/validated/t-001.md"));
    assert!(p.exists(".project/sessions/active/s/qa/validated/t-001-qa.md"));

    // Frontmatter state matches the directory (invariant 1).
    let task = p.read(".project/sessions/active/s/tasks/validated/t-001.md");
    assert_eq!(state_of(&task), "validated");

    // History appended at every step.
    assert!(task.contains("state_history"));
}

#[test]
fn session_next_walks_the_cycle() {
    let p = Project::empty();
    p.edison()
        .args(["session", "create", "--session-id", "s", "--no-worktree"])
        .assert()
        .success();
    p.edison()
        .args(["task", "create", "t-1", "--title", "Work", "--session-id", "s"])
        .assert()
        .success();

    // Todo task: next recommends claiming it.
    p.edison()
        .args(["session", "next", "--session-id", "s", "--format", "json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("task.claim"));

    p.edison().args(["task", "claim", "t-1"]).assert().success();

    // Wip without evidence: next recommends capture.
    p.edison()
        .args(["session", "next", "--session-id", "s", "--format", "json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("evidence.capture"));

    p.full_evidence("t-1");

    // Evidence complete: next previews the done promotion.
    p.edison()
        .args(["session", "next", "--session-id", "s", "--format", "json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("task.promote.done"));
}
