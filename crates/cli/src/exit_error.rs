// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

/// Exit code for generic failures (including evidence/validation).
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for worktree enforcement blocks.
pub const EXIT_ENFORCEMENT: i32 = 2;
/// Exit code when a configured script/command cannot be found.
pub const EXIT_SCRIPT_NOT_FOUND: i32 = 127;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
    /// Machine-readable error code for JSON envelopes.
    pub error_code: String,
    /// Structured context rendered into JSON envelopes.
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            error_code: "error".to_string(),
            context: serde_json::Map::new(),
        }
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = error_code.into();
        self
    }

    pub fn with_context(mut self, key: &str, value: serde_json::Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }

    /// Canonical JSON envelope: `{success:false, error:{…}}`.
    pub fn envelope(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": {
                "message": self.message,
                "code": self.error_code,
                "context": self.context,
            },
        })
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
