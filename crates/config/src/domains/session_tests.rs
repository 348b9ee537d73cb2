// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::ConfigRegistry;
use std::path::Path;

#[test]
fn default_known_agents_include_common_set() {
    let reg = ConfigRegistry::from_value(Path::new("/repo"), Value::Null).unwrap();
    let s = SessionConfig::new(reg.merged());
    let agents = s.known_agents();
    for expected in ["claude", "codex", "aider", "edison"] {
        assert!(agents.iter().any(|a| a == expected), "missing {expected}");
    }
}

#[test]
fn worktree_defaults() {
    let reg = ConfigRegistry::from_value(Path::new("/repo"), Value::Null).unwrap();
    let s = SessionConfig::new(reg.merged());
    assert!(s.worktree_enabled());
    assert_eq!(s.worktree_base(), ".worktrees");
    assert_eq!(s.branch_prefix(), "session/");
    assert_eq!(s.base_branch(), "main");
    assert!(!s.enforcement_enabled());
    assert!(s.enforced_commands().is_empty());
}

#[test]
fn enforcement_overlay() {
    let overlay: Value = serde_yaml::from_str(
        "session:\n  worktree:\n    enforcement:\n      enabled: true\n      commands: [evidence capture]\n",
    )
    .unwrap();
    let reg = ConfigRegistry::from_value(Path::new("/repo"), overlay).unwrap();
    let s = SessionConfig::new(reg.merged());
    assert!(s.enforcement_enabled());
    assert_eq!(s.enforced_commands(), vec!["evidence capture"]);
}
