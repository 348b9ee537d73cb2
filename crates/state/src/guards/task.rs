// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-side guards: dependency satisfaction and the evidence gate.

use crate::context::GuardContext;
use crate::env::WorkflowEnv;

/// All `depends_on` entries are in a satisfied state within scope.
pub fn dependencies_satisfied(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> bool {
    match ctx.task_id {
        Some(task_id) => env.dependency_blockers(task_id).is_empty(),
        None => false,
    }
}

/// Every required `command-*.txt` exists, parses strictly, and exited 0.
pub fn has_command_evidence(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> bool {
    match ctx.task_id {
        Some(task_id) => env
            .evidence_blockers(task_id)
            .iter()
            .all(|b| b.kind != "command"),
        None => false,
    }
}

/// The implementer's report exists for the current round.
pub fn has_implementation_report(ctx: &GuardContext<'_>, env: &dyn WorkflowEnv) -> bool {
    match ctx.task_id {
        Some(task_id) => env
            .evidence_blockers(task_id)
            .iter()
            .all(|b| b.kind != "report"),
        None => false,
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
