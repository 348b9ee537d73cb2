// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! QA-side guards.
//!
//! All guards follow the FAIL-CLOSED principle: missing data, absent
//! reports, or an unreadable bundle all evaluate to `false`.

use crate::context::GuardContext;
use crate::env::WorkflowEnv;
use std::collections::BTreeSet;

/// QA can leave `waiting` once its task finished implementation.
pub fn can_start_qa(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> bool {
    let Some(task_id) = ctx.task_id else {
        return false;
    };
    let Ok(Some(task)) = env.load_task(task_id) else {
        return false;
    };
    let done = env.semantic_state("task", "done");
    let validated = env.semantic_state("task", "validated");
    task.state == done || task.state == validated
}

/// At least one validator report exists for the current round and the
/// required evidence set is complete.
pub fn has_validator_reports(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> bool {
    let Some(task_id) = ctx.task_id else {
        return false;
    };
    let round = env.current_round(task_id);
    if round == 0 {
        return false;
    }
    if env.validator_reports(task_id, round).is_empty() {
        return false;
    }
    env.evidence_blockers(task_id).is_empty()
}

/// Every blocking validator in the expected set produced a passing report.
pub fn can_validate_qa(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> bool {
    let Some(task_id) = ctx.task_id else {
        return false;
    };
    let round = env.current_round(task_id);
    if round == 0 {
        return false;
    }
    let reports = env.validator_reports(task_id, round);
    if reports.is_empty() {
        return false;
    }
    let passed: BTreeSet<&str> = reports
        .iter()
        .filter(|r| r.is_passed())
        .map(|r| r.validator_id.as_str())
        .collect();
    env.expected_validators(task_id)
        .iter()
        .filter(|v| v.blocking)
        .all(|v| passed.contains(v.id.as_str()))
}

/// Wave-aware pass check: every wave that contains expected validators has
/// all of its blocking members approved.
pub fn has_all_waves_passed(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> bool {
    let Some(task_id) = ctx.task_id else {
        return false;
    };
    let round = env.current_round(task_id);
    if round == 0 {
        return false;
    }
    let reports = env.validator_reports(task_id, round);
    let passed: BTreeSet<&str> = reports
        .iter()
        .filter(|r| r.is_passed())
        .map(|r| r.validator_id.as_str())
        .collect();

    let expected = env.expected_validators(task_id);
    if expected.is_empty() {
        return false;
    }
    let waves: BTreeSet<&str> = expected.iter().map(|v| v.wave.as_str()).collect();
    for wave in waves {
        let ok = expected
            .iter()
            .filter(|v| v.wave == wave && v.blocking)
            .all(|v| passed.contains(v.id.as_str()));
        if !ok {
            return false;
        }
    }
    true
}

/// An approved bundle summary exists for the latest round.
pub fn has_bundle_approval(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> bool {
    let Some(task_id) = ctx.task_id else {
        return false;
    };
    let round = env.current_round(task_id);
    if round == 0 {
        return false;
    }
    match env.read_bundle(task_id, round) {
        Some(bundle) => bundle.approved && bundle.round == round,
        None => false,
    }
}

#[cfg(test)]
#[path = "qa_tests.rs"]
mod tests;
