// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::ConfigRegistry;
use std::path::Path;

#[test]
fn default_readiness_policy() {
    let reg = ConfigRegistry::from_value(Path::new("/repo"), serde_yaml::Value::Null).unwrap();
    let wf = WorkflowConfig::new(reg.merged());
    let policy = TaskConfig::new(reg.merged()).readiness_policy(&wf).unwrap();
    assert_eq!(policy.todo_state, "todo");
    assert_eq!(policy.satisfied_states, vec!["done", "validated"]);
    assert!(policy.missing_dependency_blocks);
}

#[test]
fn unknown_semantic_entries_are_skipped() {
    let overlay: serde_yaml::Value = serde_yaml::from_str(
        "tasks:\n  readiness:\n    dependencySatisfiedStates: [done, not-a-state]\n",
    )
    .unwrap();
    let reg = ConfigRegistry::from_value(Path::new("/repo"), overlay).unwrap();
    let wf = WorkflowConfig::new(reg.merged());
    let policy = TaskConfig::new(reg.merged()).readiness_policy(&wf).unwrap();
    assert_eq!(policy.satisfied_states, vec!["done"]);
}

#[test]
fn default_similarity_weights() {
    let reg = ConfigRegistry::from_value(Path::new("/repo"), serde_yaml::Value::Null).unwrap();
    let w = TaskConfig::new(reg.merged()).similarity_weights();
    assert_eq!(w.shingle_size, 3);
    assert!(!w.use_shingles);
    assert!((w.threshold - 0.55).abs() < f64::EPSILON);
}
