// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for tests in this crate and dependents.

use crate::graph::TaskSummary;
use crate::id::{SessionId, TaskId};
use crate::readiness::ReadinessPolicy;

/// Build a `TaskSummary` for graph tests.
pub fn summary(
    id: &str,
    state: &str,
    session_id: Option<&str>,
    depends_on: &[&str],
) -> TaskSummary {
    TaskSummary {
        id: TaskId::new(id),
        title: format!("Task {id}"),
        state: state.to_string(),
        session_id: session_id.map(SessionId::new),
        depends_on: depends_on.iter().map(|d| TaskId::new(*d)).collect(),
        related: Vec::new(),
        path: None,
    }
}

/// Same as [`summary`] with `related` links.
pub fn summary_related(
    id: &str,
    state: &str,
    depends_on: &[&str],
    related: &[&str],
) -> TaskSummary {
    let mut s = summary(id, state, None, depends_on);
    s.related = related.iter().map(|r| TaskId::new(*r)).collect();
    s
}

/// Default readiness policy used across tests.
pub fn policy() -> ReadinessPolicy {
    ReadinessPolicy {
        todo_state: "todo".to_string(),
        satisfied_states: vec!["done".to_string(), "validated".to_string()],
        missing_dependency_blocks: true,
    }
}
