// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journalled session close.
//!
//! Closing a session moves every session-scoped task and QA record into
//! the global tree, all-or-nothing. Each move is journalled before it
//! executes (`sessions/_tx/{sid}/op-{n}.json`); on failure the inverse
//! journal drives a rollback and the session stays in its pre-close state.
//! Only after every move verifies does the session advance
//! `active → closing → validated`.

use crate::error::EngineError;
use crate::resilience::scaled;
use crate::workspace::Workspace;
use edison_core::{QaRecord, Session, Task};
use edison_state::WorkflowEnv;
use edison_store::{fsio, FileEntity, LockConfig, PathLock, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One journalled move operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub seq: u32,
    /// `restore-task`, `restore-qa`, `rollback-task`, `rollback-qa`.
    pub domain: String,
    pub entity_id: String,
    pub from_path: PathBuf,
    pub to_path: PathBuf,
    pub ts: String,
}

/// Outcome of a successful close.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseReport {
    pub session_id: String,
    pub moved_tasks: Vec<String>,
    pub moved_qa: Vec<String>,
    pub journal_dir: PathBuf,
}

struct PlannedMove {
    domain: &'static str,
    entity_id: String,
    from: PathBuf,
    to: PathBuf,
    content: String,
}

pub(crate) struct CloseTransaction<'w> {
    ws: &'w Workspace,
    session: Session,
    journal_dir: PathBuf,
    lock_cfg: LockConfig,
    seq: u32,
}

impl<'w> CloseTransaction<'w> {
    pub fn new(ws: &'w Workspace, session: Session) -> Self {
        let journal_dir = ws.resolver().session_tx_dir(session.id.as_str());
        Self {
            ws,
            session,
            journal_dir,
            lock_cfg: LockConfig {
                timeout: scaled(Duration::from_secs(2)),
                poll_interval: Duration::from_millis(25),
                max_age: Duration::from_secs(300),
            },
            seq: 0,
        }
    }

    /// Execute the close. On any failure the executed moves are rolled
    /// back and the error is wrapped in [`EngineError::CloseRolledBack`].
    pub fn run(mut self) -> Result<CloseReport, EngineError> {
        let moves = self.plan()?;
        let mut done: Vec<PlannedMove> = Vec::new();

        for planned in moves {
            match self.execute(&planned) {
                Ok(()) => done.push(planned),
                Err(e) => {
                    self.rollback(&done);
                    return Err(EngineError::CloseRolledBack {
                        message: e.to_string(),
                        journal: self.journal_dir.clone(),
                    });
                }
            }
        }

        // Verification gate: every destination must exist before the
        // session advances.
        for m in &done {
            if !m.to.is_file() {
                self.rollback(&done);
                return Err(EngineError::CloseRolledBack {
                    message: format!("verification failed for {}", m.to.display()),
                    journal: self.journal_dir.clone(),
                });
            }
        }

        let session_id = self.session.id.to_string();
        let machine = self.ws.machine()?;
        machine.transition_session(&session_id, "closing", Some("session complete"))?;
        machine.transition_session(&session_id, "validated", Some("close verified"))?;

        let mut moved_tasks = Vec::new();
        let mut moved_qa = Vec::new();
        for m in &done {
            if m.domain == "restore-task" {
                moved_tasks.push(m.entity_id.clone());
            } else {
                moved_qa.push(m.entity_id.clone());
            }
        }
        tracing::debug!(
            session = %session_id,
            tasks = moved_tasks.len(),
            qa = moved_qa.len(),
            "session close complete"
        );
        Ok(CloseReport {
            session_id,
            moved_tasks,
            moved_qa,
            journal_dir: self.journal_dir,
        })
    }

    /// Compute per-entity moves: session-scoped records to the global tree,
    /// with the session back-reference cleared.
    fn plan(&self) -> Result<Vec<PlannedMove>, EngineError> {
        let sid = self.session.id.as_str();
        let mut moves = Vec::new();

        for mut task in self.ws.tasks().find_by_session(sid)? {
            let from = self.ws.tasks().get_path(task.id.as_str())?;
            let state_dir = self.ws.tasks().layout().dir_of(&task.state)?.to_string();
            let to = self.ws.resolver().tasks_dir(&state_dir).join(task.file_name());
            task.session_id = None;
            moves.push(PlannedMove {
                domain: "restore-task",
                entity_id: task.id.to_string(),
                from,
                to,
                content: render_task(&task)?,
            });
        }
        for mut qa in self.ws.qa().find_by_session(sid)? {
            let from = self.ws.qa().get_path(qa.id.as_str())?;
            let state_dir = self.ws.qa().layout().dir_of(&qa.state)?.to_string();
            let to = self.ws.resolver().qa_dir(&state_dir).join(qa.file_name());
            qa.session_id = None;
            moves.push(PlannedMove {
                domain: "restore-qa",
                entity_id: qa.id.to_string(),
                from,
                to,
                content: render_qa(&qa)?,
            });
        }
        Ok(moves)
    }

    /// One move: journal, lock destination, copy, verify, delete source.
    fn execute(&mut self, planned: &PlannedMove) -> Result<(), EngineError> {
        self.journal(planned.domain, planned, false)?;

        let _lock = PathLock::acquire(&planned.to, &self.lock_cfg)?;
        if planned.to.exists() {
            return Err(EngineError::Store(StoreError::DuplicateId {
                id: planned.entity_id.clone(),
                path: planned.to.clone(),
            }));
        }
        fsio::write_atomic(&planned.to, planned.content.as_bytes()).map_err(|source| {
            EngineError::Io {
                path: planned.to.clone(),
                source,
            }
        })?;

        let written = fsio::read_text(&planned.to).map_err(|source| EngineError::Io {
            path: planned.to.clone(),
            source,
        })?;
        if written != planned.content {
            return Err(EngineError::Io {
                path: planned.to.clone(),
                source: std::io::Error::other("copy verification mismatch"),
            });
        }

        std::fs::remove_file(&planned.from).map_err(|source| EngineError::Io {
            path: planned.from.clone(),
            source,
        })?;
        Ok(())
    }

    /// Inverse-journal rollback of completed moves, newest first.
    fn rollback(&mut self, done: &[PlannedMove]) {
        for m in done.iter().rev() {
            let domain = if m.domain == "restore-task" {
                "rollback-task"
            } else {
                "rollback-qa"
            };
            if let Err(e) = self.journal(domain, m, true) {
                tracing::warn!(error = %e, "failed to journal rollback entry");
            }
            // The source content never changed during the move, so a plain
            // copy-back restores it.
            if let Err(e) = std::fs::copy(&m.to, &m.from) {
                tracing::warn!(path = %m.from.display(), error = %e, "rollback copy failed");
                continue;
            }
            let _ = std::fs::remove_file(&m.to);
        }
    }

    fn journal(
        &mut self,
        domain: &str,
        planned: &PlannedMove,
        inverse: bool,
    ) -> Result<(), EngineError> {
        self.seq += 1;
        let entry = JournalEntry {
            seq: self.seq,
            domain: domain.to_string(),
            entity_id: planned.entity_id.clone(),
            from_path: if inverse {
                planned.to.clone()
            } else {
                planned.from.clone()
            },
            to_path: if inverse {
                planned.from.clone()
            } else {
                planned.to.clone()
            },
            ts: WorkflowEnv::now(self.ws),
        };
        let path = self.journal_dir.join(format!("op-{:04}.json", self.seq));
        let mut text = serde_json::to_string_pretty(&entry).map_err(|e| EngineError::Io {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?;
        text.push('\n');
        fsio::write_atomic(&path, text.as_bytes()).map_err(|source| EngineError::Io {
            path,
            source,
        })?;
        Ok(())
    }
}

fn render_task(task: &Task) -> Result<String, EngineError> {
    edison_store::frontmatter::render(task, task.body()).map_err(|e| EngineError::Io {
        path: PathBuf::from(task.file_name()),
        source: std::io::Error::other(e),
    })
}

fn render_qa(qa: &QaRecord) -> Result<String, EngineError> {
    edison_store::frontmatter::render(qa, qa.body()).map_err(|e| EngineError::Io {
        path: PathBuf::from(qa.file_name()),
        source: std::io::Error::other(e),
    })
}

/// Resume a partially-archived session from `sessions/recovery/{sid}/`.
///
/// Unknown fields in the archived `session.json` survive via the entity's
/// extras map; the archived directory is moved back into the active tree.
pub fn resume_from_recovery(ws: &Workspace, recovery_dir: &Path) -> Result<Session, EngineError> {
    let session_file = recovery_dir.join("session.json");
    let text = fsio::read_text(&session_file).map_err(|source| EngineError::Io {
        path: session_file.clone(),
        source,
    })?;
    let session: Session = serde_json::from_str(&text).map_err(|e| EngineError::Io {
        path: session_file.clone(),
        source: std::io::Error::other(e),
    })?;

    let active_state = ws.workflow().semantic_state("session", "active")?;
    let active_dir = ws.workflow().state_dir("session", &active_state)?;
    let home = ws
        .resolver()
        .session_dir(&active_dir, session.id.as_str());
    if let Some(parent) = home.parent() {
        std::fs::create_dir_all(parent).map_err(|source| EngineError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::rename(recovery_dir, &home).map_err(|source| EngineError::Io {
        path: recovery_dir.to_path_buf(),
        source,
    })?;

    // Canonicalise state to active; everything unknown rides along.
    let mut session = session;
    session.state = active_state;
    ws.sessions().update(&session)?;
    Ok(session)
}

#[cfg(test)]
#[path = "close_tests.rs"]
mod tests;
