// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario C: readiness, blocked diagnostics, wave planning.

use crate::prelude::*;

fn seeded() -> Project {
    let p = Project::empty();
    p.global_task("a", "done", &[]);
    p.global_task("b", "todo", &["a"]);
    p.global_task("c", "todo", &["b"]);
    p.global_task("d", "todo", &["a", "z-missing"]);
    p
}

#[test]
fn only_b_is_ready() {
    let p = seeded();
    let output = p
        .edison()
        .args(["task", "status", "b", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let payload: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(payload["ready"], serde_json::json!(true));

    let output = p
        .edison()
        .args(["task", "status", "c", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let payload: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(payload["ready"], serde_json::json!(false));
}

#[test]
fn blocked_lists_c_and_d_with_reasons() {
    let p = seeded();
    let output = p
        .edison()
        .args(["task", "blocked", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let payload: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let blocked = payload.as_array().unwrap();
    let ids: Vec<&str> = blocked.iter().map(|b| b["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["c", "d"]);

    let c = &blocked[0];
    assert_eq!(c["blockedBy"][0]["dependencyId"], serde_json::json!("b"));
    assert_eq!(
        c["blockedBy"][0]["reason"],
        serde_json::json!("dependency not in a satisfied state")
    );

    let d = &blocked[1];
    let d_reasons: Vec<&str> = d["blockedBy"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["reason"].as_str().unwrap())
        .collect();
    assert!(d_reasons.contains(&"dependency task not found"));
}

#[test]
fn plan_waves_via_session_next() {
    let p = seeded();
    p.edison()
        .args(["session", "create", "--session-id", "s", "--no-worktree"])
        .assert()
        .success();

    let output = p
        .edison()
        .args(["session", "next", "--session-id", "s", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();

    let claims: Vec<(String, u64)> = plan["actions"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["action"] == "task.claim")
        .map(|a| {
            (
                a["taskId"].as_str().unwrap().to_string(),
                a["wave"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(claims, vec![("b".to_string(), 1), ("c".to_string(), 2)]);

    let blocked_ids: Vec<&str> = plan["blockers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["taskId"].as_str().unwrap())
        .collect();
    assert!(blocked_ids.contains(&"d"));
}

#[test]
fn empty_graph_yields_no_ready_no_blocked() {
    let p = Project::empty();
    let output = p
        .edison()
        .args(["task", "blocked", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let payload: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(payload, serde_json::json!([]));
}
