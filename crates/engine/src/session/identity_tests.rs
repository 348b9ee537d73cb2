// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn chain() -> Vec<ProcessInfo> {
    vec![
        ProcessInfo {
            pid: 500,
            ppid: 400,
            name: "edison".to_string(),
        },
        ProcessInfo {
            pid: 400,
            ppid: 300,
            name: "node".to_string(),
        },
        ProcessInfo {
            pid: 300,
            ppid: 200,
            name: "claude".to_string(),
        },
        ProcessInfo {
            pid: 200,
            ppid: 1,
            name: "zsh".to_string(),
        },
    ]
}

fn agents() -> Vec<String> {
    ["claude", "codex", "edison"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn topmost_known_agent_wins() {
    // Both edison (pid 500) and claude (pid 300) match; topmost is claude.
    let id = infer_from_chain(&chain(), &agents()).unwrap();
    assert_eq!(id.as_str(), "claude-pid-300");
}

#[test]
fn falls_back_to_current_process() {
    let id = infer_from_chain(
        &chain(),
        &["gemini".to_string()],
    )
    .unwrap();
    assert_eq!(id.as_str(), "edison-pid-500");
}

#[test]
fn name_matching_tolerates_suffixes() {
    let chain = vec![ProcessInfo {
        pid: 7,
        ppid: 1,
        name: "claude-code".to_string(),
    }];
    let id = infer_from_chain(&chain, &agents()).unwrap();
    assert_eq!(id.as_str(), "claude-code-pid-7");
}

#[test]
fn process_chain_has_current_process() {
    let chain = process_chain();
    assert!(!chain.is_empty());
    assert_eq!(chain[0].pid, std::process::id());
}

#[test]
#[serial]
fn explicit_beats_everything() {
    std::env::set_var(ENV_SESSION, "env-session");
    let tmp = tempfile::tempdir().unwrap();
    let id = resolve_session_id(Some("explicit-id"), tmp.path(), &agents()).unwrap();
    assert_eq!(id.as_str(), "explicit-id");
    std::env::remove_var(ENV_SESSION);
}

#[test]
#[serial]
fn pin_file_beats_env() {
    std::env::set_var(ENV_SESSION, "env-session");
    let tmp = tempfile::tempdir().unwrap();
    PathResolver::write_pin(tmp.path(), "pinned-session").unwrap();
    let nested = tmp.path().join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();
    let id = resolve_session_id(None, &nested, &agents()).unwrap();
    assert_eq!(id.as_str(), "pinned-session");
    std::env::remove_var(ENV_SESSION);
}

#[test]
#[serial]
fn env_used_when_no_pin() {
    std::env::set_var(ENV_SESSION, "env-session");
    let tmp = tempfile::tempdir().unwrap();
    let id = resolve_session_id(None, tmp.path(), &agents()).unwrap();
    assert_eq!(id.as_str(), "env-session");
    std::env::remove_var(ENV_SESSION);
}

#[test]
fn invalid_explicit_id_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(resolve_session_id(Some("../escape"), tmp.path(), &agents()).is_err());
}
