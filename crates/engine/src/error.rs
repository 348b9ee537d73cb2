// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] edison_config::ConfigError),

    #[error(transparent)]
    Root(#[from] edison_config::RootError),

    #[error(transparent)]
    Store(#[from] edison_store::StoreError),

    #[error(transparent)]
    Evidence(#[from] edison_store::EvidenceError),

    #[error(transparent)]
    State(#[from] edison_state::StateError),

    #[error(transparent)]
    Id(#[from] edison_core::IdError),

    #[error("git: {message}")]
    Git { message: String },

    #[error("session {id} not found")]
    SessionNotFound { id: String },

    #[error("session close failed and was rolled back: {message} (journal: {journal})")]
    CloseRolledBack { message: String, journal: PathBuf },

    #[error("worktree enforcement: command must run inside the session worktree {worktree}")]
    WorktreeEnforcement {
        session_id: String,
        worktree: PathBuf,
        archived_worktree: Option<PathBuf>,
    },

    #[error("validator dispatch failed for {validator}: {message}")]
    Dispatch { validator: String, message: String },

    #[error("web server for validator {validator} failed to become healthy within {timeout_secs}s")]
    WebServerUnhealthy { validator: String, timeout_secs: u64 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
