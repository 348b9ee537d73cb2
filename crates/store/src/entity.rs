// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frontmatter-file entity store for tasks and QA records.
//!
//! Entities live at `{tree}/{state_dir}/{id}.md`, where the tree is the
//! global management tree or one session's scoped tree. The parent
//! directory name is the on-disk materialization of state; the frontmatter
//! `state` field is authoritative and a mismatch is hard corruption.

use crate::cache::{CacheKey, LruCache};
use crate::error::StoreError;
use crate::frontmatter;
use crate::fsio;
use crate::lock::{LockConfig, PathLock};
use edison_config::{ConfigError, PathResolver, WorkflowConfig};
use edison_core::{QaRecord, SessionId, Task};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Entity kinds stored as frontmatter files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Qa,
}

impl EntityKind {
    /// Subtree name under the management dir / session home.
    pub fn subtree(self) -> &'static str {
        match self {
            EntityKind::Task => "tasks",
            EntityKind::Qa => "qa",
        }
    }

    /// Workflow entity key used for config lookups.
    pub fn workflow_entity(self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::Qa => "qa",
        }
    }
}

/// An entity persisted as a frontmatter file.
pub trait FileEntity: Serialize + DeserializeOwned + Clone + Send {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn state(&self) -> &str;
    fn session_id(&self) -> Option<&SessionId>;
    fn body(&self) -> &str;
    fn set_body(&mut self, body: String);

    fn file_name(&self) -> String {
        format!("{}.md", self.id())
    }
}

impl FileEntity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        self.id.as_str()
    }
    fn state(&self) -> &str {
        &self.state
    }
    fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }
    fn body(&self) -> &str {
        &self.description
    }
    fn set_body(&mut self, body: String) {
        self.description = body;
    }
}

impl FileEntity for QaRecord {
    const KIND: EntityKind = EntityKind::Qa;

    fn id(&self) -> &str {
        self.id.as_str()
    }
    fn state(&self) -> &str {
        &self.state
    }
    fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }
    fn body(&self) -> &str {
        &self.description
    }
    fn set_body(&mut self, body: String) {
        self.description = body;
    }
}

/// Resolved directory layout for one entity kind.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    kind: EntityKind,
    /// `(state, dir)` pairs for the entity's own states.
    state_dirs: Vec<(String, String)>,
    /// Directory names of the session container states (active, closing, …).
    session_state_dirs: Vec<String>,
}

impl StoreLayout {
    pub fn from_workflow(
        kind: EntityKind,
        workflow: &WorkflowConfig<'_>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            kind,
            state_dirs: workflow.state_dirs(kind.workflow_entity())?,
            session_state_dirs: workflow
                .state_dirs("session")?
                .into_iter()
                .map(|(_, dir)| dir)
                .collect(),
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Directory name for a state; unknown states fail closed.
    pub fn dir_of(&self, state: &str) -> Result<&str, StoreError> {
        self.state_dirs
            .iter()
            .find(|(s, _)| s == state)
            .map(|(_, d)| d.as_str())
            .ok_or_else(|| {
                StoreError::Config(ConfigError::MissingKey {
                    key: format!(
                        "workflow.{}.states.{state}",
                        self.kind.workflow_entity()
                    ),
                })
            })
    }

    /// State name for a directory, if configured.
    pub fn state_of_dir(&self, dir: &str) -> Option<&str> {
        self.state_dirs
            .iter()
            .find(|(_, d)| d == dir)
            .map(|(s, _)| s.as_str())
    }
}

/// Typed store over one entity kind.
pub struct EntityStore<T: FileEntity> {
    resolver: PathResolver,
    layout: StoreLayout,
    lock_cfg: LockConfig,
    cache: Mutex<LruCache<T>>,
}

/// Default bound for the per-store read cache.
const CACHE_CAPACITY: usize = 256;

impl<T: FileEntity> EntityStore<T> {
    pub fn new(resolver: PathResolver, layout: StoreLayout) -> Self {
        Self {
            resolver,
            layout,
            lock_cfg: LockConfig::default(),
            cache: Mutex::new(LruCache::new(CACHE_CAPACITY)),
        }
    }

    pub fn with_lock_config(mut self, lock_cfg: LockConfig) -> Self {
        self.lock_cfg = lock_cfg;
        self
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn lock_config(&self) -> &LockConfig {
        &self.lock_cfg
    }

    fn tree_dir(&self, session: Option<(&str, &str)>, state_dir: &str) -> PathBuf {
        let subtree = self.layout.kind.subtree();
        match session {
            None => self
                .resolver
                .management_dir()
                .join(subtree)
                .join(state_dir),
            Some((session_state_dir, sid)) => self
                .resolver
                .session_dir(session_state_dir, sid)
                .join(subtree)
                .join(state_dir),
        }
    }

    /// Every directory this kind's entities may inhabit, global first, then
    /// each session scope.
    fn all_dirs(&self) -> Vec<(Option<String>, PathBuf)> {
        let mut out = Vec::new();
        for (_, state_dir) in &self.layout.state_dirs {
            out.push((None, self.tree_dir(None, state_dir)));
        }
        for session_state_dir in &self.layout.session_state_dirs {
            let container = self.resolver.sessions_dir(session_state_dir);
            let Ok(entries) = std::fs::read_dir(&container) else {
                continue;
            };
            let mut session_ids: Vec<String> = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name != "_tx" && name != "recovery")
                .collect();
            session_ids.sort();
            for sid in session_ids {
                for (_, state_dir) in &self.layout.state_dirs {
                    out.push((
                        Some(sid.clone()),
                        self.tree_dir(Some((session_state_dir, &sid)), state_dir),
                    ));
                }
            }
        }
        out
    }

    /// Locate the session home (`sessions/{state_dir}/{sid}`) for a scoped
    /// entity, across all session container states.
    fn session_home_dir(&self, sid: &str) -> Option<(String, String)> {
        for session_state_dir in &self.layout.session_state_dirs {
            if self.resolver.session_dir(session_state_dir, sid).is_dir() {
                return Some((session_state_dir.clone(), sid.to_string()));
            }
        }
        None
    }

    fn read_entity(&self, path: &Path) -> Result<T, StoreError> {
        let text = fsio::read_text(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (mut entity, body): (T, String) =
            frontmatter::parse(&text).map_err(|message| StoreError::Frontmatter {
                path: path.to_path_buf(),
                message,
            })?;
        entity.set_body(body);

        // Invariant: parent dir name materializes the frontmatter state.
        let dir_name = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let expected_dir = self.layout.dir_of(entity.state())?;
        if dir_name != expected_dir {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                dir_state: dir_name,
                front_state: entity.state().to_string(),
            });
        }
        Ok(entity)
    }

    fn cache_key(entity: &T) -> CacheKey {
        (
            entity.id().to_string(),
            entity.session_id().map(|s| s.to_string()),
        )
    }

    /// Find an entity anywhere (global tree first, then sessions).
    pub fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        {
            let mut cache = self.cache.lock();
            if let Some(hit) = cache.get_by_id(id) {
                return Ok(Some(hit));
            }
        }
        match self.find_path(id)? {
            Some(path) => {
                let entity = self.read_entity(&path)?;
                self.cache.lock().put(Self::cache_key(&entity), entity.clone());
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// On-disk path of an entity.
    pub fn get_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        self.find_path(id)?.ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })
    }

    fn find_path(&self, id: &str) -> Result<Option<PathBuf>, StoreError> {
        let file_name = format!("{id}.md");
        for (_, dir) in self.all_dirs() {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Every entity of this kind, global and session-scoped.
    pub fn find_all(&self) -> Result<Vec<T>, StoreError> {
        let mut out = Vec::new();
        for (_, dir) in self.all_dirs() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            let mut paths: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|e| e == "md").unwrap_or(false))
                .collect();
            paths.sort();
            for path in paths {
                out.push(self.read_entity(&path)?);
            }
        }
        Ok(out)
    }

    /// Entities scoped to one session.
    pub fn find_by_session(&self, session_id: &str) -> Result<Vec<T>, StoreError> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|e| e.session_id().map(|s| s.as_str()) == Some(session_id))
            .collect())
    }

    fn target_path(&self, entity: &T) -> Result<PathBuf, StoreError> {
        let state_dir = self.layout.dir_of(entity.state())?.to_string();
        let session = match entity.session_id() {
            None => None,
            Some(sid) => Some(self.session_home_dir(sid.as_str()).ok_or_else(|| {
                StoreError::NotFound {
                    id: format!("session {sid}"),
                }
            })?),
        };
        let dir = self.tree_dir(
            session.as_ref().map(|(a, b)| (a.as_str(), b.as_str())),
            &state_dir,
        );
        Ok(dir.join(entity.file_name()))
    }

    /// Create a new entity; fails if the id already exists anywhere.
    pub fn create(&self, entity: &T) -> Result<PathBuf, StoreError> {
        if let Some(existing) = self.find_path(entity.id())? {
            return Err(StoreError::DuplicateId {
                id: entity.id().to_string(),
                path: existing,
            });
        }
        let path = self.target_path(entity)?;
        let _lock = PathLock::acquire(&path, &self.lock_cfg)?;
        self.write_entity(entity, &path)?;
        tracing::debug!(id = entity.id(), path = %path.display(), "created entity");
        Ok(path)
    }

    /// Replace an entity on disk, moving it between state directories when
    /// its state changed.
    pub fn update(&self, entity: &T) -> Result<PathBuf, StoreError> {
        let old_path = self.find_path(entity.id())?;
        let new_path = self.target_path(entity)?;
        let lock_target = old_path.clone().unwrap_or_else(|| new_path.clone());
        let _lock = PathLock::acquire(&lock_target, &self.lock_cfg)?;
        self.write_entity(entity, &new_path)?;
        if let Some(old) = old_path {
            if old != new_path {
                std::fs::remove_file(&old).map_err(|source| StoreError::Io {
                    path: old.clone(),
                    source,
                })?;
            }
        }
        self.cache.lock().invalidate_id(entity.id());
        Ok(new_path)
    }

    /// Remove an entity's file (session close moves use copy + delete).
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.get_path(id)?;
        let _lock = PathLock::acquire(&path, &self.lock_cfg)?;
        std::fs::remove_file(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        self.cache.lock().invalidate_id(id);
        Ok(())
    }

    fn write_entity(&self, entity: &T, path: &Path) -> Result<(), StoreError> {
        let text = frontmatter::render(entity, entity.body()).map_err(|e| {
            StoreError::Frontmatter {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        fsio::write_atomic(path, text.as_bytes()).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.cache.lock().invalidate_id(entity.id());
        Ok(())
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
