// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn task_id_display_and_eq() {
    let id = TaskId::new("fix-login-bug");
    assert_eq!(id.to_string(), "fix-login-bug");
    assert_eq!(id, "fix-login-bug");
}

#[test]
fn qa_id_derived_from_task() {
    let task = TaskId::new("t-001");
    let qa = task.qa_id();
    assert_eq!(qa.as_str(), "t-001-qa");
    assert_eq!(qa.task_id(), Some(task));
}

#[test]
fn qa_id_without_suffix_has_no_task() {
    assert_eq!(QaId::new("weird").task_id(), None);
}

#[test]
fn task_id_serde_is_transparent() {
    let id = TaskId::new("t-001");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"t-001\"");
    let parsed: TaskId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn task_id_borrow_str_map_lookup() {
    let mut map = std::collections::HashMap::new();
    map.insert(TaskId::new("t-001"), 1);
    assert_eq!(map.get("t-001"), Some(&1));
}

#[parameterized(
    simple = { "claude-pid-1234" },
    dotted = { "agent.v2-pid-9" },
    underscore = { "my_session" },
)]
fn sanitized_accepts(raw: &str) {
    assert!(SessionId::sanitized(raw).is_ok());
}

#[parameterized(
    slash = { "a/b" },
    backslash = { "a\\b" },
    traversal = { "../etc" },
    dotdot_inner = { "a..b" },
    space = { "a b" },
)]
fn sanitized_rejects(raw: &str) {
    assert!(SessionId::sanitized(raw).is_err());
}

#[test]
fn sanitized_rejects_empty() {
    assert_eq!(SessionId::sanitized(""), Err(IdError::Empty));
}

#[test]
fn inferred_replaces_odd_characters() {
    let id = SessionId::inferred("claude code", 42).unwrap();
    assert_eq!(id.as_str(), "claude-code-pid-42");
}
