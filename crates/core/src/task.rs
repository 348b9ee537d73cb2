// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task entity and semantic states.
//!
//! A task's on-disk `state` is a configurable string; [`TaskSemantic`] names
//! the semantic roles the workflow config maps those strings onto. The
//! markdown body (`description`) lives outside the frontmatter and is
//! attached by the store codec after parsing.

use crate::history::HistoryEntry;
use crate::id::{SessionId, TaskId};
use serde::{Deserialize, Serialize};

/// Semantic task states, resolved to on-disk state names via config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSemantic {
    Todo,
    Wip,
    Done,
    Validated,
}

crate::simple_display! {
    TaskSemantic {
        Todo => "todo",
        Wip => "wip",
        Done => "done",
        Validated => "validated",
    }
}

/// Creation/update metadata carried in frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub created_by: String,
}

/// External-system linkage (speckit, openspec, …).
///
/// `payload` is opaque to the core; sync actions interpret it per `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_yaml::Value,
}

/// Unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<TaskId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<Integration>,
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

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            state: state.into(),
            session_id: None,
            owner: None,
            depends_on: Vec::new(),
            parent_id: None,
            child_ids: Vec::new(),
            related: Vec::new(),
            tags: Vec::new(),
            integration: None,
            metadata: Metadata::default(),
            state_history: Vec::new(),
            extras: serde_yaml::Mapping::new(),
            description: String::new(),
        }
    }

    /// True when the task lives in the global tree (no owning session).
    pub fn is_global(&self) -> bool {
        self.session_id.is_none()
    }

    /// Append a history entry. History is append-only by construction:
    /// there is no API that rewrites past entries.
    pub fn record_transition(&mut self, entry: HistoryEntry) {
        self.state = entry.to.clone();
        self.state_history.push(entry);
    }
}

crate::setters! {
    impl Task {
        into {
            title: String,
        }
        set {
            depends_on: Vec<TaskId>,
            related: Vec<TaskId>,
            tags: Vec<String>,
        }
        option {
            session_id: SessionId,
            owner: String,
            parent_id: TaskId,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
