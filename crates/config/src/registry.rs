// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered configuration registry.
//!
//! Loads every `*.yml`/`*.yaml` under each layer's `config/` directory
//! (plus active pack overlays), merges them low → high with the array-marker
//! semantics from [`crate::value`], and exposes the merged tree to the typed
//! domain views. Instances are cached per `(project_root, fingerprint)` so
//! repeated loads in one process are cheap; `clear_all_caches` exists for
//! tests and reconfiguration.

use crate::error::ConfigError;
use crate::layers::{resolve_layer_stack, LayerStack};
use crate::value::deep_merge;
use parking_lot::Mutex;
use serde_yaml::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Top-level keys accepted under strict validation.
const KNOWN_TOP_LEVEL_KEYS: &[&str] = &[
    "workflow",
    "tasks",
    "qa",
    "validation",
    "session",
    "composition",
    "context7",
    "adapters",
    "resilience",
    "layers",
    "packs",
];

static BUNDLED_DEFAULTS: &str = include_str!("bundled_defaults.yaml");

fn cache() -> &'static Mutex<HashMap<(PathBuf, String), Arc<ConfigRegistry>>> {
    static CACHE: OnceLock<Mutex<HashMap<(PathBuf, String), Arc<ConfigRegistry>>>> =
        OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Drop every cached registry. For tests and reconfiguration.
pub fn clear_all_caches() {
    cache().lock().clear();
}

/// Merged configuration for one project root.
#[derive(Debug)]
pub struct ConfigRegistry {
    root: PathBuf,
    stack: LayerStack,
    merged: Value,
    fingerprint: String,
}

impl ConfigRegistry {
    /// Load (or fetch from cache) the registry for a project root.
    ///
    /// `user_dir` is the user overlay home (normally `$HOME/.edison`).
    pub fn load(root: &Path, user_dir: &Path) -> Result<Arc<Self>, ConfigError> {
        let stack = resolve_layer_stack(root, user_dir)?;
        let files = collect_config_files(&stack);
        let fingerprint = fingerprint_files(&files)?;

        let key = (root.to_path_buf(), fingerprint.clone());
        if let Some(hit) = cache().lock().get(&key) {
            return Ok(Arc::clone(hit));
        }

        let merged = merge_files(&files)?;
        tracing::debug!(
            root = %root.display(),
            layers = stack.layers.len(),
            files = files.len(),
            "loaded config stack"
        );
        let registry = Arc::new(Self {
            root: root.to_path_buf(),
            stack,
            merged,
            fingerprint,
        });
        cache().lock().insert(key, Arc::clone(&registry));
        Ok(registry)
    }

    /// Build a registry from an in-memory overlay only (tests).
    pub fn from_value(root: &Path, overlay: Value) -> Result<Self, ConfigError> {
        let bundled: Value =
            serde_yaml::from_str(BUNDLED_DEFAULTS).map_err(|source| ConfigError::Yaml {
                path: PathBuf::from("<bundled>"),
                source,
            })?;
        let merged = deep_merge(bundled, overlay);
        Ok(Self {
            root: root.to_path_buf(),
            stack: LayerStack {
                repo_root: root.to_path_buf(),
                layers: Vec::new(),
                project_local_config_dir: root.join(".edison").join("config.local"),
            },
            merged,
            fingerprint: String::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    /// The fully merged configuration tree.
    pub fn merged(&self) -> &Value {
        &self.merged
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Reject unknown top-level keys (strict mode).
    pub fn validate_strict(&self) -> Result<(), ConfigError> {
        let Some(map) = self.merged.as_mapping() else {
            return Ok(());
        };
        let mut unknown: Vec<String> = map
            .keys()
            .filter_map(Value::as_str)
            .filter(|k| !KNOWN_TOP_LEVEL_KEYS.contains(k))
            .map(str::to_string)
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            unknown.sort();
            Err(ConfigError::UnknownKeys {
                keys: unknown.join(", "),
            })
        }
    }
}

/// Config files low → high: bundled is embedded; each layer contributes its
/// `config/` dir, then active pack overlays, then project-local.
fn collect_config_files(stack: &LayerStack) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for layer in &stack.layers {
        dirs.push(layer.path.join("config"));
    }
    for (_, pack_root) in stack.pack_roots() {
        if let Ok(entries) = std::fs::read_dir(&pack_root) {
            let mut packs: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            packs.sort();
            for pack in packs {
                dirs.push(pack.join("config"));
            }
        }
    }
    dirs.push(stack.project_local_config_dir.clone());

    for dir in dirs {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut layer_files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("yml") | Some("yaml")
                ) && p.file_name().map(|n| n != "layers.yaml").unwrap_or(true)
            })
            .collect();
        layer_files.sort();
        files.extend(layer_files);
    }
    files
}

fn merge_files(files: &[PathBuf]) -> Result<Value, ConfigError> {
    let mut merged: Value =
        serde_yaml::from_str(BUNDLED_DEFAULTS).map_err(|source| ConfigError::Yaml {
            path: PathBuf::from("<bundled>"),
            source,
        })?;
    for path in files {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let value: Value = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.clone(),
            source,
        })?;
        if value.is_mapping() {
            merged = deep_merge(merged, value);
        }
    }
    Ok(merged)
}

fn fingerprint_files(files: &[PathBuf]) -> Result<String, ConfigError> {
    let mut hasher = Sha256::new();
    for path in files {
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update([0]);
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        hasher.update(&bytes);
        hasher.update([0]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
