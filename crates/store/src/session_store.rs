// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session persistence: one `session.json` per session home directory.
//!
//! Unlike tasks and QA records, a session state change moves the whole
//! session directory (including its scoped task/QA trees) between the
//! session container state directories.

use crate::error::StoreError;
use crate::fsio;
use crate::lock::{LockConfig, PathLock};
use edison_config::{PathResolver, WorkflowConfig};
use edison_core::Session;
use std::path::PathBuf;

const SESSION_FILE: &str = "session.json";

pub struct SessionStore {
    resolver: PathResolver,
    /// `(state, dir)` pairs for session container states.
    state_dirs: Vec<(String, String)>,
    lock_cfg: LockConfig,
}

impl SessionStore {
    pub fn new(resolver: PathResolver, workflow: &WorkflowConfig<'_>) -> Result<Self, StoreError> {
        Ok(Self {
            resolver,
            state_dirs: workflow.state_dirs("session")?,
            lock_cfg: LockConfig::default(),
        })
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn dir_of(&self, state: &str) -> Result<&str, StoreError> {
        self.state_dirs
            .iter()
            .find(|(s, _)| s == state)
            .map(|(_, d)| d.as_str())
            .ok_or_else(|| {
                StoreError::Config(edison_config::ConfigError::MissingKey {
                    key: format!("workflow.session.states.{state}"),
                })
            })
    }

    /// The session's home directory, wherever it currently lives.
    pub fn find_home(&self, id: &str) -> Option<PathBuf> {
        for (_, dir) in &self.state_dirs {
            let home = self.resolver.session_dir(dir, id);
            if home.join(SESSION_FILE).is_file() {
                return Some(home);
            }
        }
        None
    }

    pub fn get(&self, id: &str) -> Result<Option<Session>, StoreError> {
        let Some(home) = self.find_home(id) else {
            return Ok(None);
        };
        let path = home.join(SESSION_FILE);
        let text = fsio::read_text(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let session: Session =
            serde_json::from_str(&text).map_err(|e| StoreError::Frontmatter {
                path: path.clone(),
                message: e.to_string(),
            })?;

        // Directory materializes state; frontmatter field is authoritative.
        let dir_name = home
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let expected = self.dir_of(&session.state)?;
        if dir_name != expected {
            return Err(StoreError::Corrupt {
                path,
                dir_state: dir_name,
                front_state: session.state.clone(),
            });
        }
        Ok(Some(session))
    }

    pub fn find_all(&self) -> Result<Vec<Session>, StoreError> {
        let mut out = Vec::new();
        for (_, dir) in &self.state_dirs {
            let container = self.resolver.sessions_dir(dir);
            let Ok(entries) = std::fs::read_dir(&container) else {
                continue;
            };
            let mut ids: Vec<String> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n != "_tx" && n != "recovery")
                .collect();
            ids.sort();
            for id in ids {
                if let Some(session) = self.get(&id)? {
                    out.push(session);
                }
            }
        }
        Ok(out)
    }

    pub fn create(&self, session: &Session) -> Result<PathBuf, StoreError> {
        if let Some(existing) = self.find_home(session.id.as_str()) {
            return Err(StoreError::DuplicateId {
                id: session.id.to_string(),
                path: existing,
            });
        }
        let dir = self.dir_of(&session.state)?.to_string();
        let home = self.resolver.session_dir(&dir, session.id.as_str());
        let path = home.join(SESSION_FILE);
        let _lock = PathLock::acquire(&path, &self.lock_cfg)?;
        self.write(session, &path)?;
        Ok(path)
    }

    /// Rewrite `session.json`, moving the session home when state changed.
    pub fn update(&self, session: &Session) -> Result<PathBuf, StoreError> {
        let new_dir = self.dir_of(&session.state)?.to_string();
        let new_home = self.resolver.session_dir(&new_dir, session.id.as_str());
        let old_home = self.find_home(session.id.as_str());

        let path = new_home.join(SESSION_FILE);
        match old_home {
            Some(old) if old != new_home => {
                let _lock = PathLock::acquire(&old.join(SESSION_FILE), &self.lock_cfg)?;
                if let Some(parent) = new_home.parent() {
                    std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                std::fs::rename(&old, &new_home).map_err(|source| StoreError::Io {
                    path: old.clone(),
                    source,
                })?;
                self.write(session, &path)?;
            }
            _ => {
                let _lock = PathLock::acquire(&path, &self.lock_cfg)?;
                self.write(session, &path)?;
            }
        }
        Ok(path)
    }

    fn write(&self, session: &Session, path: &std::path::Path) -> Result<(), StoreError> {
        let mut text = serde_json::to_string_pretty(session).map_err(|e| {
            StoreError::Frontmatter {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        text.push('\n');
        fsio::write_atomic(path, text.as_bytes()).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "session_store_tests.rs"]
mod tests;
