// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario B: guard failure leaves the entity untouched.

use crate::prelude::*;

#[test]
fn failing_lint_blocks_ready_and_names_the_fix() {
    let p = Project::empty();
    p.edison()
        .args(["session", "create", "--session-id", "s", "--no-worktree"])
        .assert()
        .success();
    p.edison()
        .args(["task", "create", "t-001", "--title", "Fix login", "--session-id", "s"])
        .assert()
        .success();
    p.edison().args(["task", "claim", "t-001"]).assert().success();

    // Same evidence as the happy path, but lint failed.
    for name in ["type-check", "test", "build"] {
        p.command_evidence("t-001", 1, name, 0);
    }
    p.command_evidence("t-001", 1, "lint", 1);
    p.implementation_report("t-001", 1);

    let history_before = p.read(".project/sessions/active/s/tasks/wip/t-001.md");

    p.edison()
        .args(["task", "ready", "t-001"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("lint"))
        .stderr(predicates::str::contains("npm run lint"));

    // Task remains wip; no new history entry.
    assert!(p.exists(".project/sessions/active/s/tasks/wip/t-001.md"));
    assert!(!p.exists(".project/sessions/active/s/tasks/done/t-001.md"));
    let history_after = p.read(".project/sessions/active/s/tasks/wip/t-001.md");
    assert_eq!(history_before, history_after, "file byte-identical after failed guard");
}

#[test]
fn missing_frontmatter_header_also_blocks() {
    let p = Project::empty();
    p.edison()
        .args(["session", "create", "--session-id", "s", "--no-worktree"])
        .assert()
        .success();
    p.edison()
        .args(["task", "create", "t-002", "--title", "Other", "--session-id", "s"])
        .assert()
        .success();
    p.edison().args(["task", "claim", "t-002"]).assert().success();

    p.full_evidence("t-002");
    // Overwrite one capture with a headerless file.
    p.file(
        ".project/qa/validation-evidence/t-002/round-1/command-test.txt",
        "raw output without header\n",
    );

    p.edison()
        .args(["task", "ready", "t-002"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("frontmatter"));
}

#[test]
fn guard_failure_json_envelope_carries_violations() {
    let p = Project::empty();
    p.edison()
        .args(["session", "create", "--session-id", "s", "--no-worktree"])
        .assert()
        .success();
    p.edison()
        .args(["task", "create", "t-003", "--title", "JSON", "--session-id", "s"])
        .assert()
        .success();
    p.edison().args(["task", "claim", "t-003"]).assert().success();

    let output = p
        .edison()
        .args(["task", "ready", "t-003", "--json"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let envelope: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(envelope["success"], serde_json::json!(false));
    assert_eq!(envelope["error"]["code"], serde_json::json!("guard_failed"));
    let violations = envelope["error"]["context"]["violations"].as_array().unwrap();
    assert!(!violations.is_empty());
}
