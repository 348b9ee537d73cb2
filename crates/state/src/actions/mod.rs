// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action registry and built-in actions.
//!
//! Actions run after all guards pass, in declaration order. A failing
//! action triggers the compensators of already-executed actions (reverse
//! order) and surfaces; the entity itself is only written after every
//! action succeeded.

use crate::context::GuardContext;
use crate::env::WorkflowEnv;
use crate::error::StateError;
use edison_core::HistoryEntry;
use edison_store::BundleSummary;
use std::collections::BTreeMap;

/// A registered action side effect.
pub type ActionFn = fn(&GuardContext<'_>, &dyn WorkflowEnv) -> Result<(), StateError>;

/// An action with an optional compensating rollback.
#[derive(Clone, Copy)]
pub struct ActionDef {
    pub run: ActionFn,
    pub compensate: Option<ActionFn>,
}

/// Named action lookup.
#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, ActionDef>,
}

impl ActionRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in action.
    pub fn builtin() -> Self {
        let mut reg = Self::default();
        reg.register("update_session_activity_log", update_session_activity_log, None);
        reg.register(
            "propagate_qa_advancement_on_task_done",
            propagate_qa_advancement_on_task_done,
            None,
        );
        reg.register("record_bundle_approval", record_bundle_approval, None);
        reg.register("sync_speckit_task_sources", sync_speckit_task_sources, None);
        reg.register("sync_openspec_task_sources", sync_openspec_task_sources, None);
        reg
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        run: ActionFn,
        compensate: Option<ActionFn>,
    ) {
        self.actions.insert(name.into(), ActionDef { run, compensate });
    }

    pub fn get(&self, name: &str) -> Option<ActionDef> {
        self.actions.get(name).copied()
    }
}

/// Append a promotion message to the owning session's activity log.
fn update_session_activity_log(
    ctx: &GuardContext<'_>,
    env: &dyn WorkflowEnv,
) -> Result<(), StateError> {
    let session_id = ctx
        .task
        .and_then(|t| t.session_id.as_ref())
        .or_else(|| ctx.qa.and_then(|q| q.session_id.as_ref()));
    let Some(session_id) = session_id else {
        return Ok(()); // global entities have no activity log
    };
    env.log_session_activity(
        session_id.as_str(),
        &format!("{} {} moved {} -> {}", ctx.entity, ctx.id, ctx.from, ctx.to),
        Some(ctx.id),
    )
}

/// When a task reaches done, its waiting QA record advances to todo.
fn propagate_qa_advancement_on_task_done(
    ctx: &GuardContext<'_>,
    env: &dyn WorkflowEnv,
) -> Result<(), StateError> {
    let Some(task) = ctx.task else {
        return Ok(());
    };
    let done = env.semantic_state("task", "done");
    if ctx.to != done {
        return Ok(());
    }
    let qa_id = task.id.qa_id();
    let Some(mut qa) = env.load_qa(qa_id.as_str())? else {
        return Ok(()); // QA creation is optional at task creation time
    };
    let waiting = env.semantic_state("qa", "waiting");
    let todo = env.semantic_state("qa", "todo");
    if qa.state != waiting {
        return Ok(());
    }
    qa.record_transition(
        HistoryEntry::new(qa.state.clone(), todo, env.now())
            .with_reason(format!("task {} reached {}", task.id, ctx.to)),
    );
    env.save_qa(&qa)
}

/// Ensure a bundle summary exists for the current round, synthesising one
/// from the expected set and the on-disk reports when absent.
fn record_bundle_approval(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> Result<(), StateError> {
    let Some(task_id) = ctx.task_id else {
        return Ok(());
    };
    let round = env.current_round(task_id);
    if round == 0 || env.read_bundle(task_id, round).is_some() {
        return Ok(());
    }
    let reports = env.validator_reports(task_id, round);
    let expected = env.expected_validators(task_id);
    let mut passed = Vec::new();
    let mut failed = Vec::new();
    for v in &expected {
        let ok = reports
            .iter()
            .any(|r| r.validator_id == v.id && r.is_passed());
        if ok {
            passed.push(v.id.clone());
        } else {
            failed.push(v.id.clone());
        }
    }
    let approved = expected
        .iter()
        .filter(|v| v.blocking)
        .all(|v| passed.contains(&v.id));
    env.write_bundle(
        task_id,
        &BundleSummary {
            approved,
            round,
            preset: String::new(),
            passed,
            failed,
            timestamp: env.now(),
            extras: serde_json::Map::new(),
        },
    )
}

fn sync_speckit_task_sources(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> Result<(), StateError> {
    sync_kind(ctx, env, "speckit")
}

fn sync_openspec_task_sources(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> Result<(), StateError> {
    sync_kind(ctx, env, "openspec")
}

/// Mark external checkboxes when a linked task validates.
fn sync_kind(
    ctx: &GuardContext<'_>,
    env: &dyn WorkflowEnv,
    kind: &str,
) -> Result<(), StateError> {
    let Some(task) = ctx.task else {
        return Ok(());
    };
    let validated = env.semantic_state("task", "validated");
    if ctx.to != validated {
        return Ok(());
    }
    match &task.integration {
        Some(integration) if integration.kind == kind => env.sync_integration(task, kind),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
