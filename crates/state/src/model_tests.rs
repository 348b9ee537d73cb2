// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use edison_config::ConfigRegistry;
use std::path::Path;

fn model() -> WorkflowModel {
    let reg = ConfigRegistry::from_value(Path::new("/repo"), serde_yaml::Value::Null).unwrap();
    let workflow = WorkflowConfig::new(reg.merged());
    WorkflowModel::load(&workflow).unwrap()
}

#[test]
fn bundled_model_has_expected_transitions() {
    let m = model();
    assert!(m.task.transition("todo", "wip").is_some());
    assert!(m.task.transition("wip", "done").is_some());
    assert!(m.task.transition("done", "validated").is_some());
    assert!(m.task.transition("todo", "validated").is_none());

    assert!(m.qa.transition("waiting", "todo").is_some());
    assert!(m.session.transition("active", "closing").is_some());
}

#[test]
fn guards_attached_to_transitions() {
    let m = model();
    let t = m.task.transition("wip", "done").unwrap();
    assert!(t.guards.contains(&"has_command_evidence".to_string()));
}

#[test]
fn terminal_states() {
    let m = model();
    assert!(m.task.is_terminal("validated"));
    assert!(!m.task.is_terminal("todo"));
    assert!(m.qa.is_terminal("validated"));
}

#[test]
fn entity_lookup_by_name() {
    let m = model();
    assert!(m.entity("qa").transition("waiting", "todo").is_some());
    assert!(m.entity("session").transition("active", "closing").is_some());
}
