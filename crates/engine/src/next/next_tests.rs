// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use edison_core::{QaRecord, Session, TaskId};
use edison_store::{
    BundleSummary, CommandEvidence, CommandHeader, FollowUpTask, ImplementationReport, Tracking,
    ValidatorReport, Verdict,
};

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

    fn workspace(&self) -> Workspace {
        Workspace::with_user_dir(self.tmp.path(), self.user.path()).unwrap()
    }
}

fn with_session(ws: &Workspace) -> Session {
    let session = Session::new(SessionId::new("s-1"), "active", ws.now());
    ws.sessions().create(&session).unwrap();
    session
}

fn scoped_task(ws: &Workspace, id: &str, state: &str) -> Task {
    let task = Task::new(id, format!("Task {id}"), state).session_id(SessionId::new("s-1"));
    ws.tasks().create(&task).unwrap();
    task
}

fn full_evidence(ws: &Workspace, task_id: &str) {
    for name in ["type-check", "lint", "test", "build"] {
        ws.evidence()
            .write_command(
                task_id,
                &CommandEvidence {
                    header: CommandHeader {
                        evidence_version: 1,
                        evidence_kind: "command".to_string(),
                        task_id: task_id.to_string(),
                        round: 1,
                        command_name: name.to_string(),
                        command: format!("npm run {name}"),
                        cwd: std::path::PathBuf::from("/repo"),
                        exit_code: 0,
                    },
                    output: String::new(),
                },
            )
            .unwrap();
    }
    ws.evidence()
        .write_implementation_report(task_id, 1, &ImplementationReport::default())
        .unwrap();
}

#[test]
fn wip_task_without_evidence_emits_capture() {
    let f = Fixture::new();
    let ws = f.workspace();
    with_session(&ws);
    scoped_task(&ws, "t-1", "wip");

    let plan = compute_next(&ws, "s-1").unwrap();
    let capture = plan
        .actions
        .iter()
        .find(|a| a.action == "evidence.capture")
        .unwrap();
    assert_eq!(capture.task_id.as_deref(), Some("t-1"));
    assert_eq!(capture.cmd[..3], ["edison", "evidence", "capture"]);
    assert!(!plan.reports_missing.is_empty());
}

#[test]
fn wip_task_with_evidence_emits_promote_with_preview() {
    let f = Fixture::new();
    let ws = f.workspace();
    with_session(&ws);
    scoped_task(&ws, "t-1", "wip");
    full_evidence(&ws, "t-1");

    let plan = compute_next(&ws, "s-1").unwrap();
    let promote = plan
        .actions
        .iter()
        .find(|a| a.action == "task.promote.done")
        .unwrap();
    let preview = promote.guard_preview.as_ref().unwrap();
    assert_eq!(preview.from, "wip");
    assert_eq!(preview.to, "done");
    assert_eq!(preview.status, "ready");
    assert!(preview.missing.is_empty());
}

#[test]
fn done_task_without_bundle_emits_qa_actions() {
    let f = Fixture::new();
    let ws = f.workspace();
    with_session(&ws);
    scoped_task(&ws, "t-1", "done");
    let mut qa = QaRecord::for_task(&TaskId::new("t-1"), "QA", "todo");
    qa.session_id = Some(SessionId::new("s-1"));
    ws.qa().create(&qa).unwrap();
    full_evidence(&ws, "t-1");

    let plan = compute_next(&ws, "s-1").unwrap();
    let kinds: Vec<&str> = plan.actions.iter().map(|a| a.action.as_str()).collect();
    assert!(kinds.contains(&"qa.promote.wip"));
    assert!(kinds.contains(&"qa.run-validators"));
    // global-codex report expected but absent.
    assert!(plan
        .reports_missing
        .iter()
        .any(|r| r.filename == "validator-global-codex-report.json"));
}

#[test]
fn approved_bundle_emits_final_promote() {
    let f = Fixture::new();
    let ws = f.workspace();
    with_session(&ws);
    scoped_task(&ws, "t-1", "done");
    full_evidence(&ws, "t-1");
    ws.evidence()
        .write_validator_report(&ValidatorReport {
            task_id: "t-1".to_string(),
            round: 1,
            validator_id: "global-codex".to_string(),
            model: String::new(),
            verdict: Verdict::Approve,
            tracking: Tracking {
                completed_at: Some("2026-01-01T00:00:00Z".to_string()),
                ..Default::default()
            },
            strengths: Vec::new(),
            findings: Vec::new(),
            summary: None,
            follow_up_tasks: Vec::new(),
            extras: serde_json::Map::new(),
        })
        .unwrap();
    ws.evidence()
        .write_bundle(
            "t-1",
            &BundleSummary {
                approved: true,
                round: 1,
                preset: "standard".to_string(),
                passed: vec!["global-codex".to_string()],
                failed: Vec::new(),
                timestamp: ws.now(),
                extras: serde_json::Map::new(),
            },
        )
        .unwrap();

    let plan = compute_next(&ws, "s-1").unwrap();
    assert!(plan
        .actions
        .iter()
        .any(|a| a.action == "task.promote.validated"));
}

#[test]
fn todo_tasks_claimed_in_wave_order() {
    let f = Fixture::new();
    let ws = f.workspace();
    with_session(&ws);
    scoped_task(&ws, "t-a", "todo");
    let task_b =
        Task::new("t-b", "B", "todo")
            .session_id(SessionId::new("s-1"))
            .depends_on(vec![TaskId::new("t-a")]);
    ws.tasks().create(&task_b).unwrap();

    let plan = compute_next(&ws, "s-1").unwrap();
    let claims: Vec<(&str, usize)> = plan
        .actions
        .iter()
        .filter(|a| a.action == "task.claim")
        .map(|a| (a.task_id.as_deref().unwrap(), a.wave.unwrap()))
        .collect();
    assert_eq!(claims, vec![("t-a", 1), ("t-b", 2)]);
    // Claim command carries the session binding.
    let claim = plan.actions.iter().find(|a| a.action == "task.claim").unwrap();
    assert!(claim.cmd.contains(&"--session-id".to_string()));
}

#[test]
fn blocked_tasks_carry_structured_diagnostics() {
    let f = Fixture::new();
    let ws = f.workspace();
    with_session(&ws);
    let task = Task::new("t-b", "B", "todo")
        .session_id(SessionId::new("s-1"))
        .depends_on(vec![TaskId::new("ghost")]);
    ws.tasks().create(&task).unwrap();

    let plan = compute_next(&ws, "s-1").unwrap();
    assert_eq!(plan.blockers.len(), 1);
    let blocker = &plan.blockers[0];
    assert_eq!(blocker.task_id, "t-b");
    assert_eq!(blocker.blocked_by[0].dependency_id, "ghost");
    assert_eq!(blocker.blocked_by[0].reason, "dependency task not found");
}

#[test]
fn follow_ups_deduped_against_existing_tasks() {
    let f = Fixture::new();
    let ws = f.workspace();
    with_session(&ws);
    scoped_task(&ws, "t-1", "wip");
    // An existing global task that duplicates one follow-up.
    ws.tasks()
        .create(&Task::new("fix-retry-loop", "Fix the retry loop", "todo"))
        .unwrap();

    let report = ImplementationReport {
        follow_up_tasks: vec![
            FollowUpTask {
                title: "Fix the retry loop".to_string(),
                description: String::new(),
                tags: Vec::new(),
            },
            FollowUpTask {
                title: "Entirely new telemetry dashboard".to_string(),
                description: String::new(),
                tags: Vec::new(),
            },
        ],
        ..Default::default()
    };
    ws.evidence()
        .write_implementation_report("t-1", 1, &report)
        .unwrap();

    let plan = compute_next(&ws, "s-1").unwrap();
    assert_eq!(plan.follow_ups_plan.len(), 2);
    let duplicate = plan
        .follow_ups_plan
        .iter()
        .find(|s| s.title == "Fix the retry loop")
        .unwrap();
    assert_eq!(duplicate.duplicate_of.as_deref(), Some("fix-retry-loop"));
    let fresh = plan
        .follow_ups_plan
        .iter()
        .find(|s| s.title.contains("telemetry"))
        .unwrap();
    assert!(fresh.duplicate_of.is_none());
    assert_eq!(fresh.cmd[..3], ["edison", "task", "create"]);
}

#[test]
fn empty_session_recommends_completion() {
    let f = Fixture::new();
    let ws = f.workspace();
    with_session(&ws);
    let plan = compute_next(&ws, "s-1").unwrap();
    assert!(plan.actions.is_empty());
    assert!(plan.recommendations[0].contains("session complete"));
}
