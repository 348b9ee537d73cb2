// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity identifiers.
//!
//! TaskId is a stable, human-chosen kebab string. QaId is always derived from
//! the task id (`{task_id}-qa`). SessionId is either supplied explicitly or
//! inferred from the invoking process tree and must survive `sanitize`.

use thiserror::Error;

/// Suffix appended to a task id to form its QA record id.
pub const QA_SUFFIX: &str = "-qa";

/// Characters allowed in a session id besides ASCII alphanumerics.
const SESSION_ID_EXTRA: [char; 3] = ['-', '_', '.'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("empty identifier")]
    Empty,

    #[error("invalid character {ch:?} in identifier {id:?}")]
    InvalidChar { id: String, ch: char },

    #[error("identifier {id:?} contains a path traversal component")]
    Traversal { id: String },
}

crate::string_id! {
    /// Unique identifier for a task.
    ///
    /// Kebab-case, globally unique across the global tree and every session
    /// scope. Task ids are chosen by the creator, not generated.
    pub struct TaskId;
}

crate::string_id! {
    /// Unique identifier for a QA record: always `{task_id}-qa`.
    pub struct QaId;
}

crate::string_id! {
    /// Unique identifier for a session.
    ///
    /// Inferred as `{topmost_process_name}-pid-{pid}` when not supplied.
    /// Must pass [`SessionId::sanitized`] before touching the filesystem.
    pub struct SessionId;
}

impl TaskId {
    /// The QA record id shadowing this task.
    pub fn qa_id(&self) -> QaId {
        QaId::new(format!("{}{}", self.0, QA_SUFFIX))
    }
}

impl QaId {
    /// Derive the QA id for a task.
    pub fn for_task(task_id: &TaskId) -> Self {
        task_id.qa_id()
    }

    /// The task id this QA record shadows, if the id carries the QA suffix.
    pub fn task_id(&self) -> Option<TaskId> {
        self.0.strip_suffix(QA_SUFFIX).map(TaskId::new)
    }
}

impl SessionId {
    /// Validate a raw session id for filesystem use.
    ///
    /// Allowed: ASCII alphanumerics plus `-`, `_`, `.`. Rejected: empty ids,
    /// path separators, and any `..` component.
    pub fn sanitized(raw: impl Into<String>) -> Result<Self, IdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdError::Empty);
        }
        if raw == "." || raw == ".." || raw.contains("..") {
            return Err(IdError::Traversal { id: raw });
        }
        for ch in raw.chars() {
            if !ch.is_ascii_alphanumeric() && !SESSION_ID_EXTRA.contains(&ch) {
                return Err(IdError::InvalidChar { id: raw, ch });
            }
        }
        Ok(Self(raw))
    }

    /// Derive the inferred session id for a process.
    pub fn inferred(process_name: &str, pid: u32) -> Result<Self, IdError> {
        let name: String = process_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || SESSION_ID_EXTRA.contains(&c) {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        Self::sanitized(format!("{name}-pid-{pid}"))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
