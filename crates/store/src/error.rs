// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for entity storage and evidence.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed frontmatter in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    #[error("entity {id} already exists at {path}")]
    DuplicateId { id: String, path: PathBuf },

    #[error("entity not found: {id}")]
    NotFound { id: String },

    #[error(
        "state corruption at {path}: directory says {dir_state:?} but frontmatter says {front_state:?}"
    )]
    Corrupt {
        path: PathBuf,
        dir_state: String,
        front_state: String,
    },

    #[error("timed out acquiring lock {path}")]
    LockTimeout { path: PathBuf },

    #[error(transparent)]
    Config(#[from] edison_config::ConfigError),
}

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("command evidence {path} is missing its YAML frontmatter header")]
    MissingFrontmatter { path: PathBuf },

    #[error("command evidence {path} is malformed: {message}")]
    MalformedEvidence { path: PathBuf, message: String },

    #[error("malformed report {path}: {source}")]
    MalformedReport {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no evidence round exists for task {task_id}")]
    NoRound { task_id: String },
}
