// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn project_with_layers_yaml(content: &str) -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = tmp.path().join(".edison").join("config");
    std::fs::create_dir_all(&cfg).unwrap();
    std::fs::write(cfg.join("layers.yaml"), content).unwrap();
    tmp
}

fn user_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn default_stack_is_user_then_project() {
    let tmp = tempfile::tempdir().unwrap();
    let user = user_dir();
    let stack = resolve_layer_stack(tmp.path(), user.path()).unwrap();
    let ids: Vec<&str> = stack.layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["user", "project"]);
    assert!(stack
        .project_local_config_dir
        .ends_with(".edison/config.local"));
}

#[test]
fn extra_layer_inserted_after_user() {
    let tmp = project_with_layers_yaml(
        "layers:\n  roots:\n    - id: company\n      path: overlays/company\n      after: user\n",
    );
    let user = user_dir();
    let stack = resolve_layer_stack(tmp.path(), user.path()).unwrap();
    let ids: Vec<&str> = stack.layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["user", "company", "project"]);
    assert_eq!(
        stack.layer_by_id("company").unwrap().path,
        tmp.path().join("overlays/company")
    );
}

#[test]
fn extras_may_anchor_on_other_extras() {
    let tmp = project_with_layers_yaml(
        "layers:\n  roots:\n    - id: b\n      path: overlays/b\n      after: a\n    - id: a\n      path: overlays/a\n      after: user\n",
    );
    let user = user_dir();
    let stack = resolve_layer_stack(tmp.path(), user.path()).unwrap();
    let ids: Vec<&str> = stack.layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["user", "a", "b", "project"]);
}

#[test]
fn disabled_extra_is_skipped() {
    let tmp = project_with_layers_yaml(
        "layers:\n  roots:\n    - id: off\n      path: overlays/off\n      enabled: false\n",
    );
    let user = user_dir();
    let stack = resolve_layer_stack(tmp.path(), user.path()).unwrap();
    assert!(stack.layer_by_id("off").is_none());
}

#[test]
fn unknown_target_is_an_error() {
    let tmp = project_with_layers_yaml(
        "layers:\n  roots:\n    - id: x\n      path: overlays/x\n      after: ghost\n",
    );
    let user = user_dir();
    let err = resolve_layer_stack(tmp.path(), user.path());
    assert!(matches!(err, Err(ConfigError::UnknownTargetLayer { .. })));
}

#[test]
fn duplicate_layer_id_is_an_error() {
    let tmp = project_with_layers_yaml(
        "layers:\n  roots:\n    - id: project\n      path: overlays/p\n",
    );
    let user = user_dir();
    let err = resolve_layer_stack(tmp.path(), user.path());
    assert!(matches!(err, Err(ConfigError::DuplicateLayer { .. })));
}

#[test]
fn before_and_after_conflict() {
    let tmp = project_with_layers_yaml(
        "layers:\n  roots:\n    - id: x\n      path: overlays/x\n      before: user\n      after: project\n",
    );
    let user = user_dir();
    let err = resolve_layer_stack(tmp.path(), user.path());
    assert!(matches!(err, Err(ConfigError::ConflictingAnchors { .. })));
}
