// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("missing include: {target} (from {base})")]
    MissingInclude { target: PathBuf, base: PathBuf },

    #[error("circular include: {chain}")]
    CircularInclude { chain: String },

    #[error("include depth exceeded (>{max_depth}) while processing {base}")]
    DepthExceeded { max_depth: usize, base: PathBuf },

    #[error("invalid anchor '{anchor}' in {path}")]
    InvalidAnchor { anchor: String, path: PathBuf },

    #[error("unbalanced section marker '{name}' in {path}")]
    UnbalancedSection { name: String, path: PathBuf },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed rules registry {path}: {message}")]
    MalformedRegistry { path: PathBuf, message: String },
}
