// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project root resolution and well-known directory layout.
//!
//! Root resolution precedence: explicit override → `AGENTS_PROJECT_ROOT`
//! env var → nearest ancestor containing `.edison/` or `.git/` → the
//! starting directory itself.

use crate::error::RootError;
use std::path::{Path, PathBuf};

/// Project-level config overlay directory name.
pub const PROJECT_CONFIG_DIR: &str = ".edison";
/// Legacy overlay directory; read-only when present, never written.
pub const LEGACY_CONFIG_DIR: &str = ".agents";
/// Management tree holding tasks, QA, sessions, and evidence.
pub const MANAGEMENT_DIR: &str = ".project";
/// Worktree pin file, relative to the management dir inside a worktree.
pub const SESSION_ID_FILE: &str = ".session-id";
/// Composed-artifact cache directory inside the project config dir.
pub const GENERATED_DIR: &str = "_generated";

/// Env var overriding project root resolution.
pub const ENV_PROJECT_ROOT: &str = "AGENTS_PROJECT_ROOT";
/// Env var naming the active session (superseded by a worktree pin file).
pub const ENV_SESSION: &str = "AGENTS_SESSION";
/// Env var overriding the process-inferred owner.
pub const ENV_OWNER: &str = "AGENTS_OWNER";

/// Resolved path layout for one project root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the project root starting from `start`.
    ///
    /// `explicit` (a CLI flag) beats the env var, which beats marker
    /// discovery. An explicit or env-provided root that does not exist is
    /// ambiguous rather than silently invented.
    pub fn resolve_root(
        start: &Path,
        explicit: Option<&Path>,
        env_root: Option<&str>,
    ) -> Result<PathBuf, RootError> {
        if let Some(root) = explicit {
            if !root.is_dir() {
                return Err(RootError::Ambiguous {
                    message: format!("explicit root {} does not exist", root.display()),
                });
            }
            return Ok(root.to_path_buf());
        }
        if let Some(root) = env_root.filter(|s| !s.is_empty()) {
            let root = PathBuf::from(root);
            if !root.is_dir() {
                return Err(RootError::Ambiguous {
                    message: format!(
                        "{ENV_PROJECT_ROOT} points at {} which does not exist",
                        root.display()
                    ),
                });
            }
            return Ok(root);
        }
        for dir in start.ancestors() {
            if dir.join(PROJECT_CONFIG_DIR).is_dir() || dir.join(".git").exists() {
                return Ok(dir.to_path_buf());
            }
        }
        Ok(start.to_path_buf())
    }

    /// Like [`PathResolver::resolve_root`] but requires a marker.
    pub fn resolve_root_strict(start: &Path, env_root: Option<&str>) -> Result<PathBuf, RootError> {
        let root = Self::resolve_root(start, None, env_root)?;
        if root.join(PROJECT_CONFIG_DIR).is_dir() || root.join(".git").exists() {
            Ok(root)
        } else {
            Err(RootError::NotInProject {
                start: start.to_path_buf(),
            })
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_config_dir(&self) -> PathBuf {
        self.root.join(PROJECT_CONFIG_DIR)
    }

    pub fn legacy_config_dir(&self) -> PathBuf {
        self.root.join(LEGACY_CONFIG_DIR)
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.project_config_dir().join(GENERATED_DIR)
    }

    pub fn management_dir(&self) -> PathBuf {
        self.root.join(MANAGEMENT_DIR)
    }

    /// Global task directory for an on-disk state name.
    pub fn tasks_dir(&self, state_dir: &str) -> PathBuf {
        self.management_dir().join("tasks").join(state_dir)
    }

    /// Global QA directory for an on-disk state name.
    pub fn qa_dir(&self, state_dir: &str) -> PathBuf {
        self.management_dir().join("qa").join(state_dir)
    }

    /// Session container directory for an on-disk state name.
    pub fn sessions_dir(&self, state_dir: &str) -> PathBuf {
        self.management_dir().join("sessions").join(state_dir)
    }

    /// One session's home: `sessions/{state_dir}/{session_id}/`.
    pub fn session_dir(&self, state_dir: &str, session_id: &str) -> PathBuf {
        self.sessions_dir(state_dir).join(session_id)
    }

    /// Session-scoped task directory (flat layout under the session home).
    pub fn session_tasks_dir(&self, state_dir: &str, session_id: &str, task_state: &str) -> PathBuf {
        self.session_dir(state_dir, session_id)
            .join("tasks")
            .join(task_state)
    }

    /// Session-scoped QA directory.
    pub fn session_qa_dir(&self, state_dir: &str, session_id: &str, qa_state: &str) -> PathBuf {
        self.session_dir(state_dir, session_id).join("qa").join(qa_state)
    }

    /// Transaction journal directory for a session close.
    pub fn session_tx_dir(&self, session_id: &str) -> PathBuf {
        self.management_dir().join("sessions").join("_tx").join(session_id)
    }

    /// Archive of partially-closed sessions awaiting resumption.
    pub fn session_recovery_dir(&self, session_id: &str) -> PathBuf {
        self.management_dir()
            .join("sessions")
            .join("recovery")
            .join(session_id)
    }

    /// Evidence root for one task.
    pub fn evidence_dir(&self, task_id: &str) -> PathBuf {
        self.management_dir()
            .join("qa")
            .join("validation-evidence")
            .join(task_id)
    }

    /// Pin file path inside a worktree.
    pub fn pin_file(worktree: &Path) -> PathBuf {
        worktree.join(MANAGEMENT_DIR).join(SESSION_ID_FILE)
    }

    /// Read the session id pinned inside a worktree, if any.
    pub fn read_pin(worktree: &Path) -> Option<String> {
        let content = std::fs::read_to_string(Self::pin_file(worktree)).ok()?;
        let id = content.trim();
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// Write the pin file inside a worktree (creating `.project/`).
    pub fn write_pin(worktree: &Path, session_id: &str) -> std::io::Result<PathBuf> {
        let pin = Self::pin_file(worktree);
        if let Some(parent) = pin.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&pin, format!("{session_id}\n"))?;
        Ok(pin)
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
