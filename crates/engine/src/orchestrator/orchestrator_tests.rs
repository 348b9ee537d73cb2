// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::workspace::Workspace;
use edison_core::{Task, TaskId};
use edison_store::Tracking;

struct Fixture {
    tmp: tempfile::TempDir,
    user: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            tmp: tempfile::tempdir().unwrap(),
            user: tempfile::tempdir().unwrap(),
        }
    }

    fn with_config(self, yaml: &str) -> Self {
        let cfg = self.tmp.path().join(".edison/config");
        std::fs::create_dir_all(&cfg).unwrap();
        std::fs::write(cfg.join("validation.yml"), yaml).unwrap();
        self
    }

    fn workspace(&self) -> Workspace {
        Workspace::with_user_dir(self.tmp.path(), self.user.path()).unwrap()
    }
}

fn write_report(ws: &Workspace, task_id: &str, validator_id: &str, verdict: Verdict) {
    let report = ValidatorReport {
        task_id: task_id.to_string(),
        round: 1,
        validator_id: validator_id.to_string(),
        model: "codex".to_string(),
        verdict,
        tracking: Tracking {
            process_id: None,
            started_at: None,
            completed_at: Some("2026-01-01T00:05:00Z".to_string()),
        },
        strengths: Vec::new(),
        findings: Vec::new(),
        summary: None,
        follow_up_tasks: Vec::new(),
        extras: serde_json::Map::new(),
    };
    ws.evidence().write_validator_report(&report).unwrap();
}

#[tokio::test]
async fn execute_mode_aggregates_reports_into_approved_bundle() {
    let f = Fixture::new();
    let ws = f.workspace();
    ws.tasks().create(&Task::new("t-1", "T", "todo")).unwrap();
    write_report(&ws, "t-1", "global-codex", Verdict::Approve);

    let orchestrator = ValidationOrchestrator::new(&ws, true);
    let opts = RunOptions {
        execute: true,
        ..Default::default()
    };
    let runs = orchestrator
        .run("t-1", &opts, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert!(run.approved());
    let bundle = run.bundle.as_ref().unwrap();
    assert_eq!(bundle.passed, vec!["global-codex"]);
    assert!(bundle.failed.is_empty());
    assert_eq!(bundle.preset, "standard");

    // The bundle is on disk for the guards.
    assert!(ws.evidence().read_bundle("t-1", 1).unwrap().approved);
}

#[tokio::test]
async fn missing_report_fails_closed() {
    let f = Fixture::new();
    let ws = f.workspace();
    ws.tasks().create(&Task::new("t-1", "T", "todo")).unwrap();

    let orchestrator = ValidationOrchestrator::new(&ws, true);
    let opts = RunOptions {
        execute: true,
        ..Default::default()
    };
    let run = orchestrator
        .run_task("t-1", &opts, &CancellationToken::new())
        .await
        .unwrap();
    assert!(!run.approved());
    let bundle = run.bundle.unwrap();
    assert_eq!(bundle.failed, vec!["global-codex"]);
}

#[tokio::test]
async fn dry_run_writes_delegation_and_no_bundle() {
    let f = Fixture::new();
    let ws = f.workspace();
    ws.tasks().create(&Task::new("t-1", "T", "todo")).unwrap();

    let orchestrator = ValidationOrchestrator::new(&ws, false);
    let run = orchestrator
        .run_task("t-1", &RunOptions::default(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(run.bundle.is_none());
    assert!(!run.waves[0].passed);

    let delegation = ws
        .evidence()
        .round_dir("t-1", 1)
        .join("delegation-global-codex.md");
    assert!(delegation.exists());
    let content = std::fs::read_to_string(delegation).unwrap();
    assert!(content.contains("Delegation: global-codex"));
}

#[tokio::test]
async fn requires_previous_pass_stops_sequencing() {
    let f = Fixture::new().with_config(
        "validation:\n  validators:\n    static-check:\n      wave: static\n      alwaysRun: true\n      blocking: true\n    deep-review:\n      wave: review\n      alwaysRun: true\n      blocking: true\n  waves:\n    - name: static\n      continueOnFail: true\n    - name: review\n      requiresPreviousPass: true\n",
    );
    let ws = f.workspace();
    ws.tasks().create(&Task::new("t-1", "T", "todo")).unwrap();
    // static-check rejects; deep-review approves but must never be counted.
    write_report(&ws, "t-1", "static-check", Verdict::Reject);
    write_report(&ws, "t-1", "deep-review", Verdict::Approve);

    let orchestrator = ValidationOrchestrator::new(&ws, true);
    let opts = RunOptions {
        execute: true,
        ..Default::default()
    };
    let run = orchestrator
        .run_task("t-1", &opts, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(run.waves.len(), 1);
    assert_eq!(run.stopped_after.as_deref(), Some("static"));
    assert!(!run.approved());
    // deep-review never dispatched: it lands in failed.
    let bundle = run.bundle.unwrap();
    assert!(bundle.failed.contains(&"deep-review".to_string()));

    edison_config::clear_all_caches();
}

#[tokio::test]
async fn failed_wave_without_continue_stops() {
    let f = Fixture::new().with_config(
        "validation:\n  validators:\n    gate:\n      wave: static\n      alwaysRun: true\n      blocking: true\n    later:\n      wave: review\n      alwaysRun: true\n      blocking: true\n  waves:\n    - name: static\n      continueOnFail: false\n    - name: review\n",
    );
    let ws = f.workspace();
    ws.tasks().create(&Task::new("t-1", "T", "todo")).unwrap();
    write_report(&ws, "t-1", "gate", Verdict::Reject);

    let orchestrator = ValidationOrchestrator::new(&ws, true);
    let opts = RunOptions {
        execute: true,
        ..Default::default()
    };
    let run = orchestrator
        .run_task("t-1", &opts, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(run.waves.len(), 1);
    assert_eq!(run.stopped_after.as_deref(), Some("static"));

    edison_config::clear_all_caches();
}

#[tokio::test]
async fn cancellation_yields_blocked_reports() {
    let f = Fixture::new();
    let ws = f.workspace();
    ws.tasks().create(&Task::new("t-1", "T", "todo")).unwrap();
    write_report(&ws, "t-1", "global-codex", Verdict::Approve);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let orchestrator = ValidationOrchestrator::new(&ws, true);
    let opts = RunOptions {
        execute: true,
        ..Default::default()
    };
    let run = orchestrator.run_task("t-1", &opts, &cancel).await.unwrap();
    let report = &run.waves[0].reports[0];
    assert_eq!(report.verdict, Verdict::Blocked);
    assert!(!run.approved());
}

#[tokio::test]
async fn hierarchy_scope_covers_children() {
    let f = Fixture::new();
    let ws = f.workspace();
    let mut parent = Task::new("t-root", "Root", "todo");
    parent.child_ids = vec![TaskId::new("t-child")];
    ws.tasks().create(&parent).unwrap();
    ws.tasks()
        .create(&Task::new("t-child", "Child", "todo").parent_id(TaskId::new("t-root")))
        .unwrap();
    write_report(&ws, "t-root", "global-codex", Verdict::Approve);
    write_report(&ws, "t-child", "global-codex", Verdict::Approve);

    let orchestrator = ValidationOrchestrator::new(&ws, true);
    let opts = RunOptions {
        execute: true,
        hierarchy: true,
        ..Default::default()
    };
    let runs = orchestrator
        .run("t-root", &opts, &CancellationToken::new())
        .await
        .unwrap();
    let ids: Vec<&str> = runs.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(ids, vec!["t-root", "t-child"]);
    assert!(runs.iter().all(|r| r.approved()));
}
