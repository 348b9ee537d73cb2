// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guard registry and built-in guards.
//!
//! Guards are pure predicates over the transition context: anything other
//! than `true` blocks the transition (FAIL-CLOSED). They never raise; a
//! guard that cannot determine its answer returns `false`.

pub mod qa;
pub mod task;

use crate::context::GuardContext;
use crate::env::WorkflowEnv;
use std::collections::BTreeMap;

/// A registered guard predicate.
pub type GuardFn = fn(&GuardContext<'_>, &dyn WorkflowEnv) -> bool;

/// Named guard lookup.
#[derive(Default)]
pub struct GuardRegistry {
    guards: BTreeMap<String, GuardFn>,
}

impl GuardRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry preloaded with every built-in guard.
    pub fn builtin() -> Self {
        let mut reg = Self::default();
        reg.register("dependencies_satisfied", task::dependencies_satisfied);
        reg.register("has_command_evidence", task::has_command_evidence);
        reg.register("has_implementation_report", task::has_implementation_report);
        reg.register("can_start_qa", qa::can_start_qa);
        reg.register("has_validator_reports", qa::has_validator_reports);
        reg.register("can_validate_qa", qa::can_validate_qa);
        reg.register("has_all_waves_passed", qa::has_all_waves_passed);
        reg.register("has_bundle_approval", qa::has_bundle_approval);
        reg
    }

    pub fn register(&mut self, name: impl Into<String>, guard: GuardFn) {
        self.guards.insert(name.into(), guard);
    }

    pub fn get(&self, name: &str) -> Option<GuardFn> {
        self.guards.get(name).copied()
    }

    /// Actionable detail lines for a failed guard (evidence guards surface
    /// the configured fix commands).
    pub fn details_for(
        name: &str,
        ctx: &GuardContext<'_>,
        env: &dyn WorkflowEnv,
    ) -> Vec<String> {
        let Some(task_id) = ctx.task_id else {
            return Vec::new();
        };
        match name {
            "dependencies_satisfied" => env.dependency_blockers(task_id),
            "has_command_evidence" | "has_implementation_report" | "has_validator_reports" => env
                .evidence_blockers(task_id)
                .into_iter()
                .map(|b| match &b.fix {
                    Some(fix) => format!("{}: {} (Fix: {fix})", b.filename, b.message),
                    None => format!("{}: {}", b.filename, b.message),
                })
                .collect(),
            "can_validate_qa" | "has_all_waves_passed" => {
                let round = env.current_round(task_id);
                let passed: Vec<String> = env
                    .validator_reports(task_id, round)
                    .iter()
                    .filter(|r| r.is_passed())
                    .map(|r| r.validator_id.clone())
                    .collect();
                env.expected_validators(task_id)
                    .into_iter()
                    .filter(|v| v.blocking && !passed.contains(&v.id))
                    .map(|v| format!("blocking validator {} has not approved", v.id))
                    .collect()
            }
            "has_bundle_approval" => {
                vec!["no approved bundle summary for the latest round".to_string()]
            }
            _ => Vec::new(),
        }
    }
}
