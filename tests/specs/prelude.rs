// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared spec harness: a temp project plus an `edison` command builder.

use std::path::{Path, PathBuf};

pub use serial_test::serial;

/// A temp project with isolated `$HOME` and project root.
pub struct Project {
    root: tempfile::TempDir,
}

impl Project {
    /// Empty project: `.edison/config` exists so root resolution works.
    pub fn empty() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join(".edison/config")).unwrap();
        std::fs::create_dir_all(root.path().join("home")).unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a file relative to the project root (creating parents).
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root.path().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root.path().join(rel).exists()
    }

    /// An `edison` invocation rooted at this project.
    pub fn edison(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("edison").unwrap();
        cmd.current_dir(self.root.path())
            .env("HOME", self.root.path().join("home"))
            .env("AGENTS_PROJECT_ROOT", self.root.path())
            .env("TEST_TIMEOUT_MULTIPLIER", "0.05")
            .env_remove("AGENTS_SESSION")
            .env_remove("AGENTS_OWNER");
        cmd
    }

    /// Write a global task file directly (files are the interface).
    pub fn global_task(&self, id: &str, state: &str, depends_on: &[&str]) {
        let deps = if depends_on.is_empty() {
            String::new()
        } else {
            let list: Vec<String> = depends_on.iter().map(|d| format!("- {d}")).collect();
            format!("depends_on:\n{}\n", list.join("\n"))
        };
        self.file(
            &format!(".project/tasks/{state}/{id}.md"),
            &format!("---\nid: {id}\ntitle: Task {id}\nstate: {state}\n{deps}---\n\nBody.\n"),
        );
    }

    /// Write a session-scoped task file directly.
    pub fn session_task(&self, session: &str, id: &str, state: &str) {
        self.file(
            &format!(".project/sessions/active/{session}/tasks/{state}/{id}.md"),
            &format!(
                "---\nid: {id}\ntitle: Task {id}\nstate: {state}\nsession_id: {session}\n---\n\nBody.\n"
            ),
        );
    }

    /// Write a session-scoped QA record file directly.
    pub fn session_qa(&self, session: &str, task_id: &str, state: &str) {
        self.file(
            &format!(".project/sessions/active/{session}/qa/{state}/{task_id}-qa.md"),
            &format!(
                "---\nid: {task_id}-qa\ntask_id: {task_id}\ntitle: QA {task_id}\nstate: {state}\nsession_id: {session}\n---\n"
            ),
        );
    }

    /// Command evidence with the strict v1 frontmatter.
    pub fn command_evidence(&self, task_id: &str, round: u32, name: &str, exit_code: i32) {
        self.file(
            &format!(".project/qa/validation-evidence/{task_id}/round-{round}/command-{name}.txt"),
            &format!(
                "---\nevidenceVersion: 1\nevidenceKind: command\ntaskId: {task_id}\nround: {round}\ncommandName: {name}\ncommand: npm run {name}\ncwd: /repo\nexitCode: {exit_code}\n---\n\ncaptured output\n"
            ),
        );
    }

    /// Implementation report for a round.
    pub fn implementation_report(&self, task_id: &str, round: u32) {
        self.file(
            &format!(
                ".project/qa/validation-evidence/{task_id}/round-{round}/implementation-report.json"
            ),
            &format!(
                "{{\n  \"taskId\": \"{task_id}\",\n  \"round\": {round},\n  \"filesChanged\": [\"src/login.rs\"],\n  \"primaryModel\": \"codex\"\n}}\n"
            ),
        );
    }

    /// Approving validator report with a completion stamp.
    pub fn validator_report(&self, task_id: &str, round: u32, validator: &str, verdict: &str) {
        self.file(
            &format!(
                ".project/qa/validation-evidence/{task_id}/round-{round}/validator-{validator}-report.json"
            ),
            &format!(
                "{{\n  \"taskId\": \"{task_id}\",\n  \"round\": {round},\n  \"validatorId\": \"{validator}\",\n  \"model\": \"codex\",\n  \"verdict\": \"{verdict}\",\n  \"tracking\": {{\"processId\": 100, \"startedAt\": \"2026-01-01T00:00:00Z\", \"completedAt\": \"2026-01-01T00:05:00Z\"}}\n}}\n"
            ),
        );
    }

    /// The full happy-path evidence set for round 1.
    pub fn full_evidence(&self, task_id: &str) {
        for name in ["type-check", "lint", "test", "build"] {
            self.command_evidence(task_id, 1, name, 0);
        }
        self.implementation_report(task_id, 1);
    }
}

/// Extract the frontmatter `state:` value from an entity file.
pub fn state_of(content: &str) -> String {
    content
        .lines()
        .find_map(|l| l.strip_prefix("state: "))
        .unwrap_or_default()
        .trim()
        .to_string()
}
