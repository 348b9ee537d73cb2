// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario E: session close is all-or-nothing with journalled rollback.

use crate::prelude::*;

fn seeded_session(p: &Project) {
    p.edison()
        .args(["session", "create", "--session-id", "s", "--no-worktree"])
        .assert()
        .success();
    for i in 1..=5 {
        p.session_task("s", &format!("t-{i:03}"), "done");
        p.session_qa("s", &format!("t-{i:03}"), "done");
    }
}

#[test]
fn close_moves_all_records_global() {
    let p = Project::empty();
    seeded_session(&p);

    p.edison()
        .args(["session", "complete", "--session-id", "s"])
        .assert()
        .success();

    for i in 1..=5 {
        assert!(p.exists(&format!(".project/tasks/done/t-{i:03}.md")));
        assert!(p.exists(&format!(".project/qa/done/t-{i:03}-qa.md")));
        // Back-reference cleared on the global copy.
        let task = p.read(&format!(".project/tasks/done/t-{i:03}.md"));
        assert!(!task.contains("session_id"), "session_id must be cleared:\n{task}");
    }
    let session = p.read(".project/sessions/validated/s/session.json");
    assert!(session.contains("\"state\": \"validated\""));
}

#[test]
fn locked_destination_rolls_back_and_retry_succeeds() {
    let p = Project::empty();
    seeded_session(&p);

    // Simulate a conflict: a held lock on the destination for task #3.
    p.file(".project/tasks/done/t-003.md.lock", "");

    p.edison()
        .args(["session", "complete", "--session-id", "s"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("rolled back"));

    // All five tasks still under the session; session still active.
    for i in 1..=5 {
        assert!(
            p.exists(&format!(".project/sessions/active/s/tasks/done/t-{i:03}.md")),
            "task {i} must remain session-scoped"
        );
        assert!(!p.exists(&format!(".project/tasks/done/t-{i:03}.md")));
    }
    assert!(p.exists(".project/sessions/active/s/session.json"));

    // Rollback journal entries exist under _tx/s/.
    let tx_dir = p.path().join(".project/sessions/_tx/s");
    let journal_contents: Vec<String> = std::fs::read_dir(&tx_dir)
        .unwrap()
        .map(|e| std::fs::read_to_string(e.unwrap().path()).unwrap())
        .collect();
    assert!(journal_contents.iter().any(|c| c.contains("rollback-")));

    // Retry after removing the lock: same final layout as a clean close.
    std::fs::remove_file(p.path().join(".project/tasks/done/t-003.md.lock")).unwrap();
    p.edison()
        .args(["session", "complete", "--session-id", "s"])
        .assert()
        .success();
    for i in 1..=5 {
        assert!(p.exists(&format!(".project/tasks/done/t-{i:03}.md")));
    }
    assert!(p.exists(".project/sessions/validated/s/session.json"));
}

#[test]
fn empty_session_completes_cleanly() {
    let p = Project::empty();
    p.edison()
        .args(["session", "create", "--session-id", "s-empty", "--no-worktree"])
        .assert()
        .success();
    p.edison()
        .args(["session", "complete", "--session-id", "s-empty"])
        .assert()
        .success();
    assert!(p.exists(".project/sessions/validated/s-empty/session.json"));
}
