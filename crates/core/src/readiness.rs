// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Derived task readiness/blocked semantics computed from the task graph.
//!
//! A task is `ready` when it sits in the semantic todo state and every
//! `depends_on` entry is in a configured satisfied state within the task's
//! scope. Anything else in todo is `blocked`, with per-dependency
//! diagnostics explaining why.

use crate::graph::{TaskGraph, TaskSummary};
use crate::id::SessionId;
use serde::Serialize;
use std::path::PathBuf;

/// Resolved readiness configuration.
///
/// States here are on-disk state names, already resolved from semantic keys
/// by the workflow config.
#[derive(Debug, Clone)]
pub struct ReadinessPolicy {
    pub todo_state: String,
    pub satisfied_states: Vec<String>,
    /// Missing-dependency policy: when true (the default), a `depends_on`
    /// entry that resolves to no known task blocks readiness.
    pub missing_dependency_blocks: bool,
}

impl ReadinessPolicy {
    fn satisfies(&self, state: &str) -> bool {
        self.satisfied_states.iter().any(|s| s == state)
    }
}

/// Why a single dependency blocks a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedByDependency {
    pub dependency_id: String,
    pub dependency_state: Option<String>,
    pub required_states: Vec<String>,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_path: Option<PathBuf>,
}

/// Readiness verdict for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReadiness {
    pub task: TaskSummary,
    pub ready: bool,
    pub blocked_by: Vec<BlockedByDependency>,
}

/// Compute readiness/blocked semantics from the task graph.
pub struct ReadinessEvaluator<'a> {
    full: &'a TaskGraph,
    policy: &'a ReadinessPolicy,
}

impl<'a> ReadinessEvaluator<'a> {
    pub fn new(full: &'a TaskGraph, policy: &'a ReadinessPolicy) -> Self {
        Self { full, policy }
    }

    /// Evaluate a single task within its own scope.
    pub fn evaluate_task(&self, task_id: &str) -> Option<TaskReadiness> {
        let task = self.full.get(task_id)?;
        let scoped = self.full.scoped(task.session_id.as_ref());
        // A task missing its own session scope still evaluates against the
        // full graph rather than vanishing.
        let summary = scoped.get(task_id).unwrap_or(task).clone();
        Some(self.evaluate_summary(&summary, &scoped))
    }

    /// All ready tasks in the given scope, ordered by id.
    pub fn ready_tasks(&self, session_id: Option<&SessionId>) -> Vec<TaskReadiness> {
        self.in_scope(session_id, |r| r.ready)
    }

    /// All dependency-blocked todo tasks in the given scope, ordered by id.
    pub fn blocked_tasks(&self, session_id: Option<&SessionId>) -> Vec<TaskReadiness> {
        self.in_scope(session_id, |r| !r.ready && !r.blocked_by.is_empty())
    }

    fn in_scope(
        &self,
        session_id: Option<&SessionId>,
        keep: impl Fn(&TaskReadiness) -> bool,
    ) -> Vec<TaskReadiness> {
        let scoped = self.full.scoped(session_id);
        let mut out = Vec::new();
        for task in scoped.tasks.values() {
            if task.state != self.policy.todo_state {
                continue;
            }
            if let Some(sid) = session_id {
                if task.session_id.as_ref() != Some(sid) {
                    continue;
                }
            }
            let r = self.evaluate_summary(task, &scoped);
            if keep(&r) {
                out.push(r);
            }
        }
        out
    }

    pub(crate) fn evaluate_summary(&self, task: &TaskSummary, scoped: &TaskGraph) -> TaskReadiness {
        if task.state != self.policy.todo_state {
            return TaskReadiness {
                task: task.clone(),
                ready: false,
                blocked_by: Vec::new(),
            };
        }

        let mut blocked = Vec::new();
        for dep_id in &task.depends_on {
            match scoped.get(dep_id.as_str()) {
                None => {
                    if !self.policy.missing_dependency_blocks {
                        continue;
                    }
                    // Distinguish "exists in another session" from "not found".
                    if let Some(found) = self.full.get(dep_id.as_str()) {
                        if let Some(other) = &found.session_id {
                            blocked.push(BlockedByDependency {
                                dependency_id: dep_id.to_string(),
                                dependency_state: Some(found.state.clone()),
                                required_states: self.policy.satisfied_states.clone(),
                                reason: format!("dependency exists in another session ({other})"),
                                dependency_session_id: Some(other.clone()),
                                dependency_path: found.path.clone(),
                            });
                            continue;
                        }
                    }
                    blocked.push(BlockedByDependency {
                        dependency_id: dep_id.to_string(),
                        dependency_state: None,
                        required_states: self.policy.satisfied_states.clone(),
                        reason: "dependency task not found".to_string(),
                        dependency_session_id: None,
                        dependency_path: None,
                    });
                }
                Some(dep) if !self.policy.satisfies(&dep.state) => {
                    blocked.push(BlockedByDependency {
                        dependency_id: dep.id.to_string(),
                        dependency_state: Some(dep.state.clone()),
                        required_states: self.policy.satisfied_states.clone(),
                        reason: "dependency not in a satisfied state".to_string(),
                        dependency_session_id: dep.session_id.clone(),
                        dependency_path: dep.path.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        TaskReadiness {
            task: task.clone(),
            ready: blocked.is_empty(),
            blocked_by: blocked,
        }
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
