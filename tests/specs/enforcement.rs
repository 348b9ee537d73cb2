// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario F: worktree enforcement blocks mutating commands.

use crate::prelude::*;

fn enforced_project() -> Project {
    let p = Project::empty();
    p.file(
        ".edison/config/session.yml",
        "session:\n  worktree:\n    enforcement:\n      enabled: true\n      commands: [evidence capture]\n",
    );
    // Session with a pinned worktree (bound by hand: temp dir is no repo).
    p.edison()
        .args(["session", "create", "--session-id", "s", "--no-worktree"])
        .assert()
        .success();
    let worktree = p.path().join(".worktrees/s");
    std::fs::create_dir_all(&worktree).unwrap();
    let session_file = p.path().join(".project/sessions/active/s/session.json");
    let mut session: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&session_file).unwrap()).unwrap();
    session["git"] = serde_json::json!({"worktreePath": worktree, "branchName": "session/s"});
    std::fs::write(&session_file, serde_json::to_string_pretty(&session).unwrap()).unwrap();

    p.edison()
        .args(["task", "create", "t-1", "--title", "Work", "--session-id", "s"])
        .assert()
        .success();
    p
}

#[test]
fn capture_outside_worktree_exits_2_with_envelope() {
    let p = enforced_project();
    let outside = tempfile::tempdir().unwrap();

    let output = p
        .edison()
        .current_dir(outside.path())
        .env("AGENTS_SESSION", "s")
        .args([
            "evidence", "capture", "t-1", "--name", "test", "--command", "true", "--json",
        ])
        .assert()
        .failure()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let envelope: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(envelope["success"], serde_json::json!(false));
    assert_eq!(
        envelope["error"]["code"],
        serde_json::json!("worktree_enforcement")
    );
    let context = &envelope["error"]["context"];
    assert_eq!(context["sessionId"], serde_json::json!("s"));
    assert!(context["worktreePath"].as_str().unwrap().ends_with(".worktrees/s"));
    assert!(context["hint"].as_str().is_some());

    // No state change on disk: no evidence round was created.
    assert!(!p.exists(".project/qa/validation-evidence/t-1/round-1"));
}

#[test]
fn capture_inside_worktree_is_allowed() {
    let p = enforced_project();
    let worktree = p.path().join(".worktrees/s");

    p.edison()
        .current_dir(&worktree)
        .env("AGENTS_SESSION", "s")
        .args([
            "evidence", "capture", "t-1", "--name", "test", "--command", "true",
        ])
        .assert()
        .success();
    assert!(p.exists(".project/qa/validation-evidence/t-1/round-1/command-test.txt"));
}

#[test]
fn capture_from_primary_checkout_is_allowed() {
    let p = enforced_project();
    p.edison()
        .env("AGENTS_SESSION", "s")
        .args([
            "evidence", "capture", "t-1", "--name", "test", "--command", "true",
        ])
        .assert()
        .success();
}

#[test]
fn unlisted_commands_are_never_blocked() {
    let p = enforced_project();
    let outside = tempfile::tempdir().unwrap();
    p.edison()
        .current_dir(outside.path())
        .env("AGENTS_SESSION", "s")
        .args(["task", "status", "t-1"])
        .assert()
        .success();
}
