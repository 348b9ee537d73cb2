// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

/// Minimal adapter writing one file per artifact with a prefix.
struct TestAdapter {
    prefix: String,
}

impl PlatformAdapter for TestAdapter {
    fn platform(&self) -> &str {
        "claude"
    }

    fn output_dir(&self) -> PathBuf {
        PathBuf::from(".claude")
    }

    fn render(&self, artifacts: &[(String, String)]) -> Vec<AdapterOutput> {
        artifacts
            .iter()
            .map(|(name, content)| AdapterOutput {
                rel_path: PathBuf::from(format!("{}{}.md", self.prefix, name)),
                content: format!("<!-- {GENERATED_TAG} -->\n{content}"),
            })
            .collect()
    }
}

fn adapter() -> TestAdapter {
    TestAdapter {
        prefix: String::new(),
    }
}

#[test]
fn first_sync_writes_everything() {
    let tmp = tempfile::tempdir().unwrap();
    let artifacts = vec![("rules".to_string(), "rule body".to_string())];
    let (written, pruned) = sync_outputs(tmp.path(), &adapter(), &artifacts).unwrap();
    assert_eq!(written.len(), 1);
    assert!(pruned.is_empty());
    assert!(tmp.path().join(".claude/rules.md").exists());
}

#[test]
fn unchanged_content_is_not_rewritten() {
    let tmp = tempfile::tempdir().unwrap();
    let artifacts = vec![("rules".to_string(), "rule body".to_string())];
    sync_outputs(tmp.path(), &adapter(), &artifacts).unwrap();
    let (written, _) = sync_outputs(tmp.path(), &adapter(), &artifacts).unwrap();
    assert!(written.is_empty(), "idempotent second sync");
}

#[test]
fn stale_generated_files_are_pruned() {
    let tmp = tempfile::tempdir().unwrap();
    let both = vec![
        ("rules".to_string(), "r".to_string()),
        ("guidelines".to_string(), "g".to_string()),
    ];
    sync_outputs(tmp.path(), &adapter(), &both).unwrap();

    let only_rules = vec![("rules".to_string(), "r".to_string())];
    let (_, pruned) = sync_outputs(tmp.path(), &adapter(), &only_rules).unwrap();
    assert_eq!(pruned.len(), 1);
    assert!(!tmp.path().join(".claude/guidelines.md").exists());
    assert!(tmp.path().join(".claude/rules.md").exists());
}

#[test]
fn untagged_files_survive_pruning() {
    let tmp = tempfile::tempdir().unwrap();
    let user_file = tmp.path().join(".claude/notes.md");
    std::fs::create_dir_all(user_file.parent().unwrap()).unwrap();
    std::fs::write(&user_file, "my own notes, no tag").unwrap();

    sync_outputs(tmp.path(), &adapter(), &[("rules".to_string(), "r".to_string())]).unwrap();
    let (_, pruned) = sync_outputs(tmp.path(), &adapter(), &[]).unwrap();
    assert!(user_file.exists(), "untagged files are never pruned");
    assert_eq!(pruned.len(), 1);
}

#[test]
fn prefix_configurability() {
    let tmp = tempfile::tempdir().unwrap();
    let adapter = TestAdapter {
        prefix: "edison-".to_string(),
    };
    sync_outputs(tmp.path(), &adapter, &[("rules".to_string(), "r".to_string())]).unwrap();
    assert!(tmp.path().join(".claude/edison-rules.md").exists());
}
