// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! QA record entity: the validation shadow of a task.

use crate::history::HistoryEntry;
use crate::id::{QaId, SessionId, TaskId};
use crate::task::Metadata;
use serde::{Deserialize, Serialize};

/// Semantic QA states, resolved to on-disk state names via config.
///
/// `Waiting` is QA-only: the record exists from task creation but has
/// nothing to validate until the task reaches `done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaSemantic {
    Waiting,
    Todo,
    Wip,
    Done,
    Validated,
}

crate::simple_display! {
    QaSemantic {
        Waiting => "waiting",
        Todo => "todo",
        Wip => "wip",
        Done => "done",
        Validated => "validated",
    }
}

/// Validation shadow of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    pub id: QaId,
    pub task_id: TaskId,
    pub title: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state_history: Vec<HistoryEntry>,
    /// Unknown frontmatter keys, preserved through round-trips.
    #[serde(flatten)]
    pub extras: serde_yaml::Mapping,
    /// Markdown body; not part of the frontmatter block.
    #[serde(skip)]
    pub description: String,
}

impl QaRecord {
    /// Create the QA shadow for a task. Inherits the task's session scope.
    pub fn for_task(task_id: &TaskId, title: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: task_id.qa_id(),
            task_id: task_id.clone(),
            title: title.into(),
            state: state.into(),
            session_id: None,
            metadata: Metadata::default(),
            state_history: Vec::new(),
            extras: serde_yaml::Mapping::new(),
            description: String::new(),
        }
    }

    pub fn record_transition(&mut self, entry: HistoryEntry) {
        self.state = entry.to.clone();
        self.state_history.push(entry);
    }
}

#[cfg(test)]
#[path = "qa_tests.rs"]
mod tests;
