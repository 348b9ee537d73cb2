// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-transition history entries.
//!
//! Every transition appends one entry; history is never rewritten. Guard
//! violations recorded here come from failed *sibling* guard evaluations on
//! transitions that were forced through (e.g. administrative overrides);
//! a clean transition records an empty list.

use serde::{Deserialize, Serialize};

/// One recorded state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub from: String,
    pub to: String,
    /// RFC 3339 timestamp of the transition.
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
}

impl HistoryEntry {
    pub fn new(from: impl Into<String>, to: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ts: ts.into(),
            reason: None,
            violations: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
