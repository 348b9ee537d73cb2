// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform adapter facade contract.
//!
//! Adapters translate composed artifacts into per-platform outputs
//! (`.claude/`, `.codex/`, `.opencode/`). The facade owns the two
//! invariants every adapter relies on: writes are idempotent, and stale
//! files tagged `edison-generated: true` are pruned when their source
//! artifact disappears.

use crate::error::ComposeError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Marker line identifying files the facade may prune.
pub const GENERATED_TAG: &str = "edison-generated: true";

/// One rendered platform output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOutput {
    /// Path relative to the platform output dir.
    pub rel_path: PathBuf,
    pub content: String,
}

/// A platform adapter renders composed artifacts into output files.
pub trait PlatformAdapter {
    /// Platform key (`claude`, `codex`, `opencode`).
    fn platform(&self) -> &str;

    /// Output directory under the project root (e.g. `.claude`).
    fn output_dir(&self) -> PathBuf;

    /// Render artifacts into relative output files. Every rendered file
    /// must carry [`GENERATED_TAG`] so stale copies can be pruned.
    fn render(&self, artifacts: &[(String, String)]) -> Vec<AdapterOutput>;
}

/// Write outputs idempotently and prune stale generated files.
///
/// Returns `(written, pruned)` paths. Files whose content is unchanged are
/// not rewritten; files in the output dir carrying the generated tag but
/// absent from this render are removed. Untagged files are never touched.
pub fn sync_outputs(
    root: &Path,
    adapter: &dyn PlatformAdapter,
    artifacts: &[(String, String)],
) -> Result<(Vec<PathBuf>, Vec<PathBuf>), ComposeError> {
    let out_dir = root.join(adapter.output_dir());
    let outputs = adapter.render(artifacts);

    let mut written = Vec::new();
    let mut keep: BTreeSet<PathBuf> = BTreeSet::new();
    for output in &outputs {
        let path = out_dir.join(&output.rel_path);
        keep.insert(path.clone());
        let existing = std::fs::read_to_string(&path).ok();
        if existing.as_deref() == Some(output.content.as_str()) {
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ComposeError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, &output.content).map_err(|source| ComposeError::Io {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }

    let mut pruned = Vec::new();
    prune_stale(&out_dir, &keep, &mut pruned)?;
    Ok((written, pruned))
}

fn prune_stale(
    dir: &Path,
    keep: &BTreeSet<PathBuf>,
    pruned: &mut Vec<PathBuf>,
) -> Result<(), ComposeError> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Ok(());
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            prune_stale(&path, keep, pruned)?;
            continue;
        }
        if keep.contains(&path) {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        if content.contains(GENERATED_TAG) {
            std::fs::remove_file(&path).map_err(|source| ComposeError::Io {
                path: path.clone(),
                source,
            })?;
            pruned.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
