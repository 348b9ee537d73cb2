// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::env::fake::FakeEnv;
use edison_config::ConfigRegistry;
use edison_core::{QaRecord, SessionId, Task, TaskId};
use edison_store::EvidenceBlocker;
use std::path::Path;

fn model() -> WorkflowModel {
    let reg = ConfigRegistry::from_value(Path::new("/repo"), serde_yaml::Value::Null).unwrap();
    let workflow = edison_config::WorkflowConfig::new(reg.merged());
    WorkflowModel::load(&workflow).unwrap()
}

#[test]
fn claim_transitions_todo_to_wip() {
    let env = FakeEnv::default().with_task(Task::new("t-1", "T", "todo"));
    let machine = StateMachine::new(model(), &env);
    let task = machine.transition_task("t-1", "wip", Some("claimed")).unwrap();
    assert_eq!(task.state, "wip");
    assert_eq!(task.state_history.len(), 1);
    assert_eq!(task.state_history[0].reason.as_deref(), Some("claimed"));
}

#[test]
fn illegal_transition_rejected() {
    let env = FakeEnv::default().with_task(Task::new("t-1", "T", "todo"));
    let machine = StateMachine::new(model(), &env);
    let err = machine.transition_task("t-1", "validated", None);
    assert!(matches!(err, Err(StateError::IllegalTransition { .. })));
}

#[test]
fn missing_entity_rejected() {
    let env = FakeEnv::default();
    let machine = StateMachine::new(model(), &env);
    assert!(matches!(
        machine.transition_task("ghost", "wip", None),
        Err(StateError::NotFound { .. })
    ));
}

#[test]
fn guard_failure_leaves_entity_unchanged() {
    let env = FakeEnv::default().with_task(Task::new("t-1", "T", "wip"));
    env.evidence_blockers.lock().insert(
        "t-1".to_string(),
        vec![EvidenceBlocker {
            kind: "command".to_string(),
            filename: "command-lint.txt".to_string(),
            message: "command exited with code 1".to_string(),
            command_name: Some("lint".to_string()),
            fix: Some("npm run lint".to_string()),
        }],
    );
    let machine = StateMachine::new(model(), &env);
    let err = machine.transition_task("t-1", "done", None);

    match err {
        Err(StateError::GuardFailed { violations, .. }) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].guard, "has_command_evidence");
            assert!(violations[0].details[0].contains("npm run lint"));
        }
        other => panic!("expected GuardFailed, got {other:?}"),
    }

    let task = env.load_task("t-1").unwrap().unwrap();
    assert_eq!(task.state, "wip");
    assert!(task.state_history.is_empty(), "no history on failed guard");
}

#[test]
fn unknown_guard_fails_closed() {
    let overlay: serde_yaml::Value = serde_yaml::from_str(
        "workflow:\n  task:\n    states:\n      todo:\n        transitions:\n          - to: wip\n            guards: [not_a_real_guard]\n",
    )
    .unwrap();
    let reg = ConfigRegistry::from_value(Path::new("/repo"), overlay).unwrap();
    let workflow = edison_config::WorkflowConfig::new(reg.merged());
    let model = WorkflowModel::load(&workflow).unwrap();

    let env = FakeEnv::default().with_task(Task::new("t-1", "T", "todo"));
    let machine = StateMachine::new(model, &env);
    let err = machine.transition_task("t-1", "wip", None);
    match err {
        Err(StateError::GuardFailed { violations, .. }) => {
            assert_eq!(violations[0].guard, "not_a_real_guard");
        }
        other => panic!("expected GuardFailed, got {other:?}"),
    }
}

#[test]
fn task_done_propagates_qa_and_logs_activity() {
    let task = Task::new("t-1", "T", "wip").session_id(SessionId::new("s-1"));
    let qa = QaRecord::for_task(&TaskId::new("t-1"), "QA", "waiting");
    let env = FakeEnv::default().with_task(task).with_qa(qa);
    let machine = StateMachine::new(model(), &env);

    let task = machine.transition_task("t-1", "done", None).unwrap();
    assert_eq!(task.state, "done");
    assert_eq!(env.load_qa("t-1-qa").unwrap().unwrap().state, "todo");
    assert!(!env.activity.lock().is_empty());
}

#[test]
fn failing_action_runs_compensators_and_surfaces() {
    fn boom(_: &GuardContext<'_>, _: &dyn crate::env::WorkflowEnv) -> Result<(), StateError> {
        Err(StateError::Env("boom".to_string()))
    }
    fn undo(ctx: &GuardContext<'_>, env: &dyn crate::env::WorkflowEnv) -> Result<(), StateError> {
        env.log_session_activity("compensated", ctx.id, None)
    }
    fn ok_action(
        ctx: &GuardContext<'_>,
        env: &dyn crate::env::WorkflowEnv,
    ) -> Result<(), StateError> {
        env.log_session_activity("ran", ctx.id, None)
    }

    let overlay: serde_yaml::Value = serde_yaml::from_str(
        "workflow:\n  task:\n    states:\n      todo:\n        transitions:\n          - to: wip\n            guards: []\n            actions: [ok_action, boom]\n",
    )
    .unwrap();
    let reg = ConfigRegistry::from_value(Path::new("/repo"), overlay).unwrap();
    let workflow = edison_config::WorkflowConfig::new(reg.merged());
    let model = WorkflowModel::load(&workflow).unwrap();

    let mut actions = ActionRegistry::empty();
    actions.register("ok_action", ok_action, Some(undo));
    actions.register("boom", boom, None);

    let env = FakeEnv::default().with_task(Task::new("t-1", "T", "todo"));
    let machine =
        StateMachine::with_registries(model, GuardRegistry::builtin(), actions, &env);
    let err = machine.transition_task("t-1", "wip", None);
    assert!(matches!(err, Err(StateError::ActionFailed { .. })));

    // Entity untouched, compensator ran after the failure.
    assert_eq!(env.load_task("t-1").unwrap().unwrap().state, "todo");
    let activity = env.activity.lock();
    assert_eq!(activity[0].0, "ran");
    assert_eq!(activity[1].0, "compensated");
}

#[test]
fn preview_reports_violations_without_mutation() {
    let env = FakeEnv::default().with_task(Task::new("t-1", "T", "wip"));
    env.evidence_blockers.lock().insert(
        "t-1".to_string(),
        vec![EvidenceBlocker {
            kind: "report".to_string(),
            filename: "implementation-report.json".to_string(),
            message: "missing evidence file".to_string(),
            command_name: None,
            fix: None,
        }],
    );
    let machine = StateMachine::new(model(), &env);
    let violations = machine.preview_task("t-1", "done").unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].guard, "has_implementation_report");
    assert_eq!(env.load_task("t-1").unwrap().unwrap().state, "wip");
}

#[test]
fn session_transition_records_history() {
    let session = edison_core::Session::new(SessionId::new("s-1"), "active", "2026-01-01T00:00:00Z");
    let env = FakeEnv::default().with_session(session);
    let machine = StateMachine::new(model(), &env);
    let s = machine.transition_session("s-1", "closing", None).unwrap();
    assert_eq!(s.state, "closing");
    assert_eq!(s.state_history.len(), 1);
}
