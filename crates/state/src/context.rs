// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guard/action evaluation context.

use edison_core::{QaRecord, Session, Task};

/// Read-only view of the transition under evaluation.
///
/// Exactly one of `task` / `qa` / `session` is set, matching `entity`.
/// `task_id` is the underlying task for both task and QA transitions.
#[derive(Clone, Copy)]
pub struct GuardContext<'a> {
    pub entity: &'a str,
    pub id: &'a str,
    pub task_id: Option<&'a str>,
    pub from: &'a str,
    pub to: &'a str,
    pub task: Option<&'a Task>,
    pub qa: Option<&'a QaRecord>,
    pub session: Option<&'a Session>,
}

impl<'a> GuardContext<'a> {
    pub fn for_task(task: &'a Task, from: &'a str, to: &'a str) -> Self {
        Self {
            entity: "task",
            id: task.id.as_str(),
            task_id: Some(task.id.as_str()),
            from,
            to,
            task: Some(task),
            qa: None,
            session: None,
        }
    }

    pub fn for_qa(qa: &'a QaRecord, from: &'a str, to: &'a str) -> Self {
        Self {
            entity: "qa",
            id: qa.id.as_str(),
            task_id: Some(qa.task_id.as_str()),
            from,
            to,
            task: None,
            qa: Some(qa),
            session: None,
        }
    }

    pub fn for_session(session: &'a Session, from: &'a str, to: &'a str) -> Self {
        Self {
            entity: "session",
            id: session.id.as_str(),
            task_id: None,
            from,
            to,
            task: None,
            qa: None,
            session: Some(session),
        }
    }
}
