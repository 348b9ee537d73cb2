// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for state transitions.

use thiserror::Error;

/// One failed guard, with optional actionable detail lines.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    pub guard: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.guard)?;
        for d in &self.details {
            write!(f, "\n  - {d}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("entity not found: {id}")]
    NotFound { id: String },

    #[error("illegal transition for {entity} {id}: {from} -> {to}")]
    IllegalTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    #[error("guard(s) failed for {entity} {id} ({from} -> {to}): {}",
            violations.iter().map(|v| v.guard.clone()).collect::<Vec<_>>().join(", "))]
    GuardFailed {
        entity: String,
        id: String,
        from: String,
        to: String,
        violations: Vec<Violation>,
    },

    #[error("action '{action}' failed during {from} -> {to}: {message}")]
    ActionFailed {
        action: String,
        from: String,
        to: String,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] edison_store::StoreError),

    #[error(transparent)]
    Config(#[from] edison_config::ConfigError),

    #[error("{0}")]
    Env(String),
}
