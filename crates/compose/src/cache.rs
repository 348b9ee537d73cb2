// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed cache for composed artifacts.
//!
//! Artifacts land under `{project_config}/_generated/` with a manifest
//! entry `{path, hash, engineVersion, dependencies}`. The hash covers the
//! engine version, optional extra keying, and the sorted dependency paths
//! plus their bytes, so touching any dependency invalidates
//! deterministically. Readers always re-verify via hash; a missing or
//! stale manifest only costs a recompute.

use crate::error::ComposeError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Composition engine version baked into every cache hash.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub hash: String,
    pub engine_version: String,
    pub dependencies: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    entries: BTreeMap<String, ManifestEntry>,
}

/// Cache rooted at a `_generated` directory.
pub struct ComposeCache {
    generated_dir: PathBuf,
}

impl ComposeCache {
    pub fn new(generated_dir: &Path) -> Self {
        Self {
            generated_dir: generated_dir.to_path_buf(),
        }
    }

    pub fn artifact_path(&self, key: &str) -> PathBuf {
        self.generated_dir.join(key)
    }

    fn manifest_path(&self) -> PathBuf {
        self.generated_dir.join(MANIFEST_FILE)
    }

    fn load_manifest(&self) -> Manifest {
        std::fs::read_to_string(self.manifest_path())
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    fn store_manifest(&self, manifest: &Manifest) -> Result<(), ComposeError> {
        let path = self.manifest_path();
        let mut text = serde_json::to_string_pretty(manifest).map_err(|e| ComposeError::Io {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?;
        text.push('\n');
        write_atomic(&path, text.as_bytes())
    }

    /// Hash over engine version, extra keying, and sorted deps + bytes.
    pub fn hash_dependencies(
        &self,
        extra: &str,
        dependencies: &[PathBuf],
    ) -> Result<String, ComposeError> {
        let mut sorted: Vec<&PathBuf> = dependencies.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut hasher = Sha256::new();
        hasher.update(ENGINE_VERSION.as_bytes());
        hasher.update([0]);
        hasher.update(extra.as_bytes());
        hasher.update([0]);
        for dep in sorted {
            hasher.update(dep.to_string_lossy().as_bytes());
            hasher.update([0]);
            let bytes = std::fs::read(dep).map_err(|source| ComposeError::Io {
                path: dep.clone(),
                source,
            })?;
            hasher.update(&bytes);
            hasher.update([0]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Read-through composition: reuse the cached artifact when the hash
    /// matches, otherwise compute, write atomically, and update the
    /// manifest (append-or-replace per key).
    pub fn compose<F>(
        &self,
        key: &str,
        extra: &str,
        dependencies: &[PathBuf],
        compute: F,
    ) -> Result<(String, bool), ComposeError>
    where
        F: FnOnce() -> Result<String, ComposeError>,
    {
        let hash = self.hash_dependencies(extra, dependencies)?;
        let artifact = self.artifact_path(key);
        let mut manifest = self.load_manifest();

        if let Some(entry) = manifest.entries.get(key) {
            if entry.hash == hash && entry.engine_version == ENGINE_VERSION {
                if let Ok(cached) = std::fs::read_to_string(&artifact) {
                    tracing::debug!(key, "compose cache hit");
                    return Ok((cached, true));
                }
            }
        }

        let content = compute()?;
        write_atomic(&artifact, content.as_bytes())?;
        let mut deps: Vec<PathBuf> = dependencies.to_vec();
        deps.sort();
        deps.dedup();
        manifest.entries.insert(
            key.to_string(),
            ManifestEntry {
                path: artifact,
                hash,
                engine_version: ENGINE_VERSION.to_string(),
                dependencies: deps,
            },
        );
        self.store_manifest(&manifest)?;
        Ok((content, false))
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ComposeError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|source| ComposeError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let tmp = dir.join(format!(
        ".tmp-{}-{}",
        std::process::id(),
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    ));
    std::fs::write(&tmp, content).map_err(|source| ComposeError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| ComposeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
