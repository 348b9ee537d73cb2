// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod compose;
pub mod config;
pub mod evidence;
pub mod qa;
pub mod rules;
pub mod session;
pub mod task;

use crate::exit_error::{ExitError, EXIT_ENFORCEMENT, EXIT_FAILURE};
use crate::output::{effective_format, OutputFormat};
use edison_engine::{EngineError, Workspace};
use edison_state::StateError;
use std::path::Path;

/// Shared command context: the wired workspace plus output preferences.
pub struct Ctx {
    pub ws: Workspace,
    format: Option<OutputFormat>,
    json: bool,
    pub cwd: std::path::PathBuf,
}

impl Ctx {
    pub fn bootstrap(
        explicit_root: Option<&Path>,
        cwd: &Path,
        format: Option<OutputFormat>,
        json: bool,
    ) -> Result<Self, ExitError> {
        let env_root = std::env::var(edison_config::ENV_PROJECT_ROOT).ok();
        let root =
            edison_config::PathResolver::resolve_root(cwd, explicit_root, env_root.as_deref())
                .map_err(|e| ExitError::new(EXIT_FAILURE, e.to_string()))?;
        let ws = Workspace::new(&root).map_err(engine_error)?;
        Ok(Self {
            ws,
            format,
            json,
            cwd: cwd.to_path_buf(),
        })
    }

    /// Effective output format given a per-command default.
    pub fn format(&self, default: OutputFormat) -> OutputFormat {
        effective_format(self.format, self.json, default)
    }

    /// Resolve the active session id (flag → pin → env → inference).
    pub fn resolve_session(&self, explicit: Option<&str>) -> Result<String, ExitError> {
        let agents = self.ws.session_config().known_agents();
        edison_engine::resolve_session_id(explicit, &self.cwd, &agents)
            .map(|id| id.to_string())
            .map_err(|e| ExitError::new(EXIT_FAILURE, e.to_string()))
    }

    /// Enforce the worktree policy for a mutating command.
    pub fn enforce_worktree(
        &self,
        command_path: &str,
        session_id: Option<&str>,
    ) -> Result<(), ExitError> {
        let Ok(resolved) = self.resolve_session(session_id) else {
            return Ok(());
        };
        let Ok(Some(session)) = self.ws.sessions().get(&resolved) else {
            return Ok(());
        };
        edison_engine::check_worktree_enforcement(&self.ws, &session, command_path, &self.cwd)
            .map_err(engine_error)
    }
}

/// Map engine errors onto exit codes and JSON envelopes.
pub fn engine_error(err: EngineError) -> ExitError {
    match err {
        EngineError::WorktreeEnforcement {
            session_id,
            worktree,
            archived_worktree,
        } => {
            let mut exit = ExitError::new(
                EXIT_ENFORCEMENT,
                format!(
                    "this command must run inside the session worktree: {}",
                    worktree.display()
                ),
            )
            .with_code("worktree_enforcement")
            .with_context("sessionId", serde_json::json!(session_id))
            .with_context("worktreePath", serde_json::json!(worktree))
            .with_context(
                "hint",
                serde_json::json!(format!("cd {} and re-run", worktree.display())),
            );
            if let Some(archived) = archived_worktree {
                exit = exit.with_context("archivedWorktreePath", serde_json::json!(archived));
            }
            exit
        }
        other => ExitError::new(EXIT_FAILURE, other.to_string()),
    }
}

/// Map state errors, rendering guard violations with their fix lines.
pub fn state_error(err: StateError) -> ExitError {
    match &err {
        StateError::GuardFailed { violations, .. } => {
            let mut message = err.to_string();
            for v in violations {
                message.push('\n');
                message.push_str(&v.to_string());
            }
            ExitError::new(EXIT_FAILURE, message)
                .with_code("guard_failed")
                .with_context(
                    "violations",
                    serde_json::to_value(violations).unwrap_or_default(),
                )
        }
        _ => ExitError::new(EXIT_FAILURE, err.to_string()).with_code("state_error"),
    }
}

pub fn store_error(err: edison_store::StoreError) -> ExitError {
    ExitError::new(EXIT_FAILURE, err.to_string()).with_code("store_error")
}

pub fn evidence_error(err: edison_store::EvidenceError) -> ExitError {
    ExitError::new(EXIT_FAILURE, err.to_string()).with_code("evidence_error")
}
