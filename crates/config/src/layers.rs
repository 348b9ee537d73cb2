// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layer stack resolution.
//!
//! The stack is seeded from bootstrap `config/layers.yaml` files merged
//! low → high. Default overlay order is `user → project`; extra layers
//! declare `{id, path, before|after, enabled}` and are placed by repeated
//! topological insertion so extras may anchor on other extras. The bundled
//! core layer is compiled into the binary and always sits below the stack;
//! `project-local` (`.edison/config.local`) always sits above it.

use crate::error::ConfigError;
use crate::paths::PathResolver;
use crate::value::deep_merge;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// A single overlay layer root (e.g. user, project, a company overlay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub id: String,
    pub path: PathBuf,
}

/// Resolved layer stack, low → high precedence.
#[derive(Debug, Clone)]
pub struct LayerStack {
    pub repo_root: PathBuf,
    /// Overlay layers between bundled core and project-local.
    pub layers: Vec<LayerSpec>,
    pub project_local_config_dir: PathBuf,
}

impl LayerStack {
    pub fn layer_by_id(&self, layer_id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    /// Config directories low → high (bundled core is embedded, not listed).
    pub fn config_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.layers.iter().map(|l| l.path.join("config")).collect();
        dirs.push(self.project_local_config_dir.clone());
        dirs
    }

    /// Pack roots low → high: each layer may carry a `packs/` directory.
    pub fn pack_roots(&self) -> Vec<(String, PathBuf)> {
        self.layers
            .iter()
            .map(|l| (l.id.clone(), l.path.join("packs")))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct ExtraLayer {
    id: String,
    path: PathBuf,
    before: Option<String>,
    after: Option<String>,
}

fn layers_yaml_paths(user_dir: &Path, project_dir: &Path, project_local: &Path) -> Vec<PathBuf> {
    vec![
        user_dir.join("config").join("layers.yaml"),
        project_dir.join("config").join("layers.yaml"),
        project_local.join("layers.yaml"),
    ]
}

fn load_bootstrap(paths: &[PathBuf]) -> Result<Value, ConfigError> {
    let mut merged = Value::Mapping(serde_yaml::Mapping::new());
    for path in paths {
        if !path.is_file() {
            continue;
        }
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

fn expand_layer_path(raw: &str, repo_root: &Path) -> PathBuf {
    let trimmed = raw.trim();
    let expanded = if let Some(rest) = trimmed.strip_prefix("~/") {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(trimmed),
        }
    } else {
        PathBuf::from(trimmed)
    };
    if expanded.is_absolute() {
        expanded
    } else {
        // Relative paths are repo-relative for portability.
        repo_root.join(expanded)
    }
}

fn parse_extra_layers(cfg: &Value, repo_root: &Path) -> Result<Vec<ExtraLayer>, ConfigError> {
    let mut parsed = Vec::new();
    let roots = match crate::value::lookup(cfg, "layers.roots").and_then(Value::as_sequence) {
        Some(seq) => seq,
        None => return Ok(parsed),
    };
    for item in roots {
        // Merge marker strings survive the bootstrap merge; skip them.
        if item.as_str().is_some() {
            continue;
        }
        let Some(map) = item.as_mapping() else { continue };
        let id = map
            .get(Value::from("id"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        let path_raw = map.get(Value::from("path")).and_then(Value::as_str);
        let (Some(path_raw), false) = (path_raw, id.is_empty()) else {
            continue;
        };
        let enabled = map
            .get(Value::from("enabled"))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        if !enabled {
            continue;
        }
        let before = map
            .get(Value::from("before"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let after = map
            .get(Value::from("after"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if before.is_some() && after.is_some() {
            return Err(ConfigError::ConflictingAnchors { id });
        }
        parsed.push(ExtraLayer {
            id,
            path: expand_layer_path(path_raw, repo_root),
            before,
            after,
        });
    }
    Ok(parsed)
}

fn insert_layer(stack: &mut Vec<LayerSpec>, extra: &ExtraLayer) -> bool {
    let target = extra
        .before
        .as_deref()
        .or(extra.after.as_deref())
        .unwrap_or("user");
    let Some(mut idx) = stack.iter().position(|l| l.id == target) else {
        return false;
    };
    if extra.after.is_some() {
        idx += 1;
    }
    stack.insert(
        idx,
        LayerSpec {
            id: extra.id.clone(),
            path: extra.path.clone(),
        },
    );
    true
}

/// Resolve the layer stack for a repository root.
///
/// `user_dir` is the user overlay home (normally `$HOME/.edison`); it is a
/// parameter so tests can isolate it.
pub fn resolve_layer_stack(repo_root: &Path, user_dir: &Path) -> Result<LayerStack, ConfigError> {
    let resolver = PathResolver::new(repo_root);
    let project_dir = resolver.project_config_dir();
    let project_local = project_dir.join("config.local");

    let bootstrap = load_bootstrap(&layers_yaml_paths(user_dir, repo_root, &project_local))?;
    let extras = parse_extra_layers(&bootstrap, repo_root)?;

    // Default stack: user → project (low → high).
    let mut stack = vec![
        LayerSpec {
            id: "user".to_string(),
            path: user_dir.to_path_buf(),
        },
        LayerSpec {
            id: "project".to_string(),
            path: project_dir.clone(),
        },
    ];

    let mut seen: std::collections::BTreeSet<String> =
        stack.iter().map(|l| l.id.clone()).collect();
    for e in &extras {
        if !seen.insert(e.id.clone()) {
            return Err(ConfigError::DuplicateLayer { id: e.id.clone() });
        }
    }

    // Repeated passes let extras anchor on other extras regardless of
    // declaration order.
    let mut pending: Vec<&ExtraLayer> = extras.iter().collect();
    let mut placed_any = true;
    while !pending.is_empty() && placed_any {
        placed_any = false;
        let mut remaining = Vec::new();
        for e in pending {
            if insert_layer(&mut stack, e) {
                placed_any = true;
            } else {
                remaining.push(e);
            }
        }
        pending = remaining;
    }

    if !pending.is_empty() {
        let known: std::collections::BTreeSet<&str> = stack
            .iter()
            .map(|l| l.id.as_str())
            .chain(pending.iter().map(|e| e.id.as_str()))
            .collect();
        let mut missing: Vec<&str> = pending
            .iter()
            .filter_map(|e| e.before.as_deref().or(e.after.as_deref()))
            .filter(|t| !known.contains(t))
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            missing.dedup();
            return Err(ConfigError::UnknownTargetLayer {
                targets: missing.join(", "),
            });
        }
        let mut ids: Vec<&str> = pending.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        return Err(ConfigError::LayerCycle {
            ids: ids.join(", "),
        });
    }

    Ok(LayerStack {
        repo_root: repo_root.to_path_buf(),
        layers: stack,
        project_local_config_dir: project_local,
    })
}

#[cfg(test)]
#[path = "layers_tests.rs"]
mod tests;
