// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session lifecycle: identity, creation, worktree binding, close.

pub mod close;
pub mod enforcement;
pub mod identity;

pub use close::{resume_from_recovery, CloseReport, JournalEntry};
pub use enforcement::check_worktree_enforcement;
pub use identity::{infer_session_id, resolve_session_id};

use crate::error::EngineError;
use crate::git::{Git, ShellGit};
use crate::workspace::Workspace;
use edison_config::PathResolver;
use edison_core::{Session, SessionId};
use std::path::PathBuf;
use std::sync::Arc;

/// Result of `session create`.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutcome {
    pub session_id: String,
    pub session_file: PathBuf,
    pub worktree_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id_file_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_worktree_path: Option<PathBuf>,
}

pub struct SessionManager<'w> {
    ws: &'w Workspace,
    git: Arc<dyn Git>,
}

impl<'w> SessionManager<'w> {
    pub fn new(ws: &'w Workspace) -> Self {
        Self {
            ws,
            git: Arc::new(ShellGit::default()),
        }
    }

    pub fn with_git(ws: &'w Workspace, git: Arc<dyn Git>) -> Self {
        Self { ws, git }
    }

    /// Create a session (explicit or inferred id), optionally materialising
    /// its git worktree and writing the pin file.
    pub async fn create(
        &self,
        explicit_id: Option<&str>,
        owner: Option<&str>,
        no_worktree: bool,
    ) -> Result<CreateOutcome, EngineError> {
        let id = match explicit_id {
            Some(raw) => SessionId::sanitized(raw)?,
            None => infer_session_id(&self.ws.session_config().known_agents())?,
        };
        if self.ws.sessions().get(id.as_str())?.is_some() {
            return Err(EngineError::Store(edison_store::StoreError::DuplicateId {
                id: id.to_string(),
                path: self
                    .ws
                    .sessions()
                    .find_home(id.as_str())
                    .unwrap_or_default(),
            }));
        }

        let active = {
            let workflow = self.ws.workflow();
            workflow.semantic_state("session", "active")?
        };
        let mut session = Session::new(id.clone(), active, self.ws.now());
        session.owner = owner
            .map(str::to_string)
            .or_else(|| std::env::var(edison_config::ENV_OWNER).ok().filter(|s| !s.is_empty()));
        let session_file = self.ws.sessions().create(&session)?;

        let mut outcome = CreateOutcome {
            session_id: id.to_string(),
            session_file,
            worktree_pinned: false,
            session_id_file_path: None,
            worktree_path: None,
            branch_name: None,
            archived_worktree_path: None,
        };

        if !no_worktree {
            let (worktree, branch, archived) = self.ensure_worktree_materialized(id.as_str()).await?;
            if let Some(worktree) = &worktree {
                let pin = PathResolver::write_pin(worktree, id.as_str()).map_err(|source| {
                    EngineError::Io {
                        path: worktree.clone(),
                        source,
                    }
                })?;
                outcome.worktree_pinned = true;
                outcome.session_id_file_path = Some(pin);
            }
            outcome.worktree_path = worktree;
            outcome.branch_name = branch;
            outcome.archived_worktree_path = archived;
        }
        Ok(outcome)
    }

    /// The single entry point that creates, reuses, or restores a
    /// session's worktree and records the binding idempotently.
    ///
    /// Returns `(worktree_path, branch_name, archived_path_if_restored)`;
    /// `(None, None, None)` when worktrees are disabled or the project is
    /// not a git repository.
    pub async fn ensure_worktree_materialized(
        &self,
        id: &str,
    ) -> Result<(Option<PathBuf>, Option<String>, Option<PathBuf>), EngineError> {
        let cfg = self.ws.session_config();
        if !cfg.worktree_enabled() {
            return Ok((None, None, None));
        }
        let repo = self.ws.root().to_path_buf();
        if !repo.join(".git").exists() {
            tracing::debug!("not a git repository; skipping worktree");
            return Ok((None, None, None));
        }

        let mut session = self
            .ws
            .sessions()
            .get(id)?
            .ok_or_else(|| EngineError::SessionNotFound { id: id.to_string() })?;

        let base = PathBuf::from(cfg.worktree_base());
        let container = if base.is_absolute() {
            base
        } else {
            repo.join(base)
        };
        let worktree = container.join(id);
        let branch = format!("{}{}", cfg.branch_prefix(), id);

        let mut archived_from = None;
        if !worktree.exists() {
            // Restore an archived worktree if a partial close left one.
            let archived = self.ws.resolver().session_recovery_dir(id).join("worktree");
            if archived.is_dir() {
                std::fs::create_dir_all(&container).map_err(|source| EngineError::Io {
                    path: container.clone(),
                    source,
                })?;
                std::fs::rename(&archived, &worktree).map_err(|source| EngineError::Io {
                    path: archived.clone(),
                    source,
                })?;
                archived_from = Some(archived);
            } else {
                self.git
                    .worktree_add(&repo, &worktree, &branch, &cfg.base_branch())
                    .await?;
            }
        }

        // Idempotent metadata update.
        let binding_changed = session.git.worktree_path.as_deref() != Some(worktree.as_path())
            || session.git.branch_name.as_deref() != Some(branch.as_str());
        if binding_changed {
            session.git.worktree_path = Some(worktree.clone());
            session.git.branch_name = Some(branch.clone());
            session.git.base_branch = Some(cfg.base_branch());
            self.ws.sessions().update(&session)?;
        }
        Ok((Some(worktree), Some(branch), archived_from))
    }

    /// Refresh session git metadata from the repository's actual worktrees.
    pub async fn sync_git(&self, id: &str) -> Result<Session, EngineError> {
        let mut session = self
            .ws
            .sessions()
            .get(id)?
            .ok_or_else(|| EngineError::SessionNotFound { id: id.to_string() })?;
        let repo = self.ws.root();
        if !repo.join(".git").exists() {
            return Ok(session);
        }
        let registered = self.git.worktree_list(repo).await?;
        if let Some(worktree) = &session.git.worktree_path {
            if !registered.contains(worktree) {
                tracing::warn!(session = id, worktree = %worktree.display(), "recorded worktree no longer registered");
                session.git.worktree_path = None;
                self.ws.sessions().update(&session)?;
            }
        }
        Ok(session)
    }

    /// Restore a session's worktree (archived or missing) on demand.
    pub async fn worktree_restore(&self, id: &str) -> Result<Option<PathBuf>, EngineError> {
        let (worktree, _, _) = self.ensure_worktree_materialized(id).await?;
        Ok(worktree)
    }

    /// Close the session: journalled all-or-nothing move of its scoped
    /// records into the global tree, then `active → closing → validated`.
    pub fn complete(&self, id: &str) -> Result<CloseReport, EngineError> {
        let session = self
            .ws
            .sessions()
            .get(id)?
            .ok_or_else(|| EngineError::SessionNotFound { id: id.to_string() })?;
        close::CloseTransaction::new(self.ws, session).run()
    }

    /// Changed files in the session's worktree relative to its base branch.
    pub async fn changed_files(&self, session: &Session) -> Result<Vec<String>, EngineError> {
        let Some(worktree) = &session.git.worktree_path else {
            return Ok(Vec::new());
        };
        let base = session
            .git
            .base_branch
            .clone()
            .unwrap_or_else(|| self.ws.session_config().base_branch());
        if !worktree.is_dir() {
            return Ok(Vec::new());
        }
        self.git.changed_files(worktree, &base).await
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
