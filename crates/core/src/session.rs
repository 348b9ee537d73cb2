// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session entity: a unit of concurrent work with an identity, an optional
//! git worktree, and an append-only activity log.
//!
//! Sessions are stored as `session.json` (not frontmatter markdown), so the
//! struct round-trips through serde_json. Unknown fields survive via the
//! flattened extras map; `resume_from_recovery` relies on this.

use crate::history::HistoryEntry;
use crate::id::{QaId, SessionId, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Semantic session states, resolved to on-disk state names via config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSemantic {
    Active,
    Closing,
    Validated,
}

crate::simple_display! {
    SessionSemantic {
        Active => "active",
        Closing => "closing",
        Validated => "validated",
    }
}

/// Git worktree binding recorded on the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
}

/// One activity-log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub ts: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_ref: Option<String>,
}

/// Session-local bookkeeping for a registered task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTaskRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<TaskId>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Session-local bookkeeping for a registered QA record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQaRef {
    #[serde(default)]
    pub task_id: TaskId,
    #[serde(default)]
    pub status: String,
}

/// Session metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    /// Redundant copy of the session id; must always equal `Session::id`.
    #[serde(default)]
    pub session_id: SessionId,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_active: String,
}

/// A unit of concurrent work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub meta: SessionMeta,
    #[serde(default)]
    pub git: GitBinding,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activity_log: Vec<ActivityEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tasks: BTreeMap<TaskId, SessionTaskRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub qa: BTreeMap<QaId, SessionQaRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state_history: Vec<HistoryEntry>,
    /// Unknown fields, preserved through round-trips.
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl Session {
    pub fn new(id: SessionId, state: impl Into<String>, created_at: impl Into<String>) -> Self {
        let created_at = created_at.into();
        Self {
            meta: SessionMeta {
                session_id: id.clone(),
                created_at: created_at.clone(),
                last_active: created_at,
            },
            id,
            state: state.into(),
            owner: None,
            git: GitBinding::default(),
            activity_log: Vec::new(),
            tasks: BTreeMap::new(),
            qa: BTreeMap::new(),
            state_history: Vec::new(),
            extras: serde_json::Map::new(),
        }
    }

    /// Append to the activity log and bump `last_active`.
    pub fn log_activity(
        &mut self,
        ts: impl Into<String>,
        message: impl Into<String>,
        entity_ref: Option<String>,
    ) {
        let ts = ts.into();
        self.meta.last_active = ts.clone();
        self.activity_log.push(ActivityEntry {
            ts,
            message: message.into(),
            entity_ref,
        });
    }

    /// Register a task in the session's bookkeeping map.
    pub fn register_task(&mut self, task_id: TaskId, entry: SessionTaskRef) {
        self.tasks.insert(task_id, entry);
    }

    /// Register a QA record in the session's bookkeeping map.
    pub fn register_qa(&mut self, qa_id: QaId, entry: SessionQaRef) {
        self.qa.insert(qa_id, entry);
    }

    pub fn record_transition(&mut self, entry: HistoryEntry) {
        self.state = entry.to.clone();
        self.state_history.push(entry);
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
