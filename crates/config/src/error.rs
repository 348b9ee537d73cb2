// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for configuration loading and path resolution.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration key: {key}")]
    MissingKey { key: String },

    #[error("configuration key {key} has wrong type (expected {expected})")]
    InvalidType { key: String, expected: &'static str },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("duplicate layer id '{id}' in layers config")]
    DuplicateLayer { id: String },

    #[error("layer '{id}' cannot specify both before and after")]
    ConflictingAnchors { id: String },

    #[error("unknown target layer(s) referenced in layers config: {targets}")]
    UnknownTargetLayer { targets: String },

    #[error("could not place layer(s): {ids}; check before/after targets for cycles")]
    LayerCycle { ids: String },

    #[error("unknown top-level configuration key(s): {keys}")]
    UnknownKeys { keys: String },

    #[error("invalid validator configuration for '{validator}': {message}")]
    InvalidValidator { validator: String, message: String },
}

#[derive(Debug, Error)]
pub enum RootError {
    #[error("not inside an Edison project (no .edison/ or .git/ marker found from {start})")]
    NotInProject { start: PathBuf },

    #[error("ambiguous project root: {message}")]
    Ambiguous { message: String },
}
