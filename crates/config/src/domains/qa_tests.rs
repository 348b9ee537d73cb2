// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::ConfigRegistry;
use std::path::Path;

#[test]
fn default_required_evidence_includes_core_commands() {
    let reg = ConfigRegistry::from_value(Path::new("/repo"), serde_yaml::Value::Null).unwrap();
    let qa = QaConfig::new(reg.merged());
    let required = qa.required_evidence();
    assert!(required.contains(&"command-test.txt".to_string()));
    assert!(required.contains(&"implementation-report.json".to_string()));
}

#[test]
fn ci_command_lookup() {
    let reg = ConfigRegistry::from_value(Path::new("/repo"), serde_yaml::Value::Null).unwrap();
    let qa = QaConfig::new(reg.merged());
    assert_eq!(qa.ci_command("lint").as_deref(), Some("npm run lint"));
    assert_eq!(qa.ci_command("nope"), None);
}

#[test]
fn overlay_replaces_required_evidence() {
    let overlay: serde_yaml::Value =
        serde_yaml::from_str("qa:\n  evidence:\n    requiredEvidence: [command-test.txt]\n")
            .unwrap();
    let reg = ConfigRegistry::from_value(Path::new("/repo"), overlay).unwrap();
    let qa = QaConfig::new(reg.merged());
    assert_eq!(qa.required_evidence(), vec!["command-test.txt"]);
}
