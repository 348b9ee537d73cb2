// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin glob-pattern matching wrapper shared by trigger evaluation.

/// True when `pattern` matches `path`. Invalid patterns never match.
pub fn matches(pattern: &str, path: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| p.matches(path))
        .unwrap_or(false)
}
