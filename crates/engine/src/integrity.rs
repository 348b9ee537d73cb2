// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace integrity verification.
//!
//! Checks the structural invariants the rest of the engine assumes:
//! frontmatter state matches the on-disk directory, every finished task has
//! a consistent QA shadow, the dependency graph is acyclic, and validated
//! tasks carry an approved bundle for their latest round. Used by the
//! session-close verification gate and `config validate`-style health
//! commands.

use crate::workspace::Workspace;
use edison_state::WorkflowEnv;
use serde::Serialize;

/// One integrity finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityFinding {
    pub category: String,
    pub entity_id: String,
    pub message: String,
}

/// Aggregated verification result.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub ok: bool,
    pub findings: Vec<IntegrityFinding>,
}

impl IntegrityReport {
    fn push(&mut self, category: &str, entity_id: impl Into<String>, message: impl Into<String>) {
        self.findings.push(IntegrityFinding {
            category: category.to_string(),
            entity_id: entity_id.into(),
            message: message.into(),
        });
    }
}

/// Verify the workspace's structural invariants.
pub fn verify_workspace(ws: &Workspace) -> IntegrityReport {
    let mut report = IntegrityReport {
        ok: true,
        findings: Vec::new(),
    };

    // State/directory mismatches surface as read errors from the stores;
    // collect them instead of failing the whole sweep.
    let tasks = match ws.tasks().find_all() {
        Ok(tasks) => tasks,
        Err(e) => {
            report.push("stateMismatches", "<tasks>", e.to_string());
            Vec::new()
        }
    };
    let qa_records = match ws.qa().find_all() {
        Ok(qa) => qa,
        Err(e) => {
            report.push("stateMismatches", "<qa>", e.to_string());
            Vec::new()
        }
    };

    let done = ws.workflow().semantic_state("task", "done").ok();
    let validated = ws.workflow().semantic_state("task", "validated").ok();
    let qa_allowed_done = ["todo", "wip", "done", "validated"];
    let qa_allowed_validated = ["done", "validated"];

    for task in &tasks {
        let finished_done = done.as_deref() == Some(task.state.as_str());
        let finished_validated = validated.as_deref() == Some(task.state.as_str());
        if !finished_done && !finished_validated {
            continue;
        }
        let qa_id = task.id.qa_id();
        let Some(qa) = qa_records.iter().find(|q| q.id == qa_id) else {
            report.push(
                "missingQa",
                task.id.as_str(),
                format!("task is {} but QA record {qa_id} does not exist", task.state),
            );
            continue;
        };
        let allowed: &[&str] = if finished_validated {
            &qa_allowed_validated
        } else {
            &qa_allowed_done
        };
        let qa_semantics: Vec<String> = allowed
            .iter()
            .map(|s| ws.semantic_state("qa", s))
            .collect();
        if !qa_semantics.iter().any(|s| s == &qa.state) {
            report.push(
                "qaInconsistent",
                task.id.as_str(),
                format!(
                    "task is {} but QA record is {} (allowed: {})",
                    task.state,
                    qa.state,
                    qa_semantics.join(", ")
                ),
            );
        }
        if finished_validated {
            let round = WorkflowEnv::current_round(ws, task.id.as_str());
            let approved = WorkflowEnv::read_bundle(ws, task.id.as_str(), round)
                .map(|b| b.approved)
                .unwrap_or(false);
            if !approved {
                report.push(
                    "bundleNotApproved",
                    task.id.as_str(),
                    format!("validated task has no approved bundle for round {round}"),
                );
            }
        }
    }

    // Dependency graph must be acyclic.
    if let Ok(graph) = ws.task_graph() {
        if let Some(on_cycle) = graph.find_cycle() {
            report.push(
                "dependencyCycle",
                on_cycle.as_str(),
                "task participates in a dependency cycle",
            );
        }
    }

    // Orphaned QA records (shadow without a task).
    for qa in &qa_records {
        if !tasks.iter().any(|t| t.id == qa.task_id) {
            report.push(
                "orphanedQa",
                qa.id.as_str(),
                format!("QA record references missing task {}", qa.task_id),
            );
        }
    }

    report.ok = report.findings.is_empty();
    report
}

#[cfg(test)]
#[path = "integrity_tests.rs"]
mod tests;
