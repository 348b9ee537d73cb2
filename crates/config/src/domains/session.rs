// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session domain: identity inference, worktree binding, enforcement.

use crate::value::{bool_or, optional_str_list, str_or};
use serde_yaml::Value;

/// Read-through view of `session.*`.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig<'a> {
    cfg: &'a Value,
}

impl<'a> SessionConfig<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    /// Process names recognised as agents during topmost-process detection.
    ///
    /// Source-configured, never built-in-only: overlays may extend or
    /// replace the list.
    pub fn known_agents(&self) -> Vec<String> {
        optional_str_list(self.cfg, "session.identity.knownAgents").unwrap_or_default()
    }

    pub fn worktree_enabled(&self) -> bool {
        bool_or(self.cfg, "session.worktree.enabled", true)
    }

    /// Worktree container directory, relative to the project root unless
    /// absolute.
    pub fn worktree_base(&self) -> String {
        str_or(self.cfg, "session.worktree.base", ".worktrees")
    }

    pub fn branch_prefix(&self) -> String {
        str_or(self.cfg, "session.worktree.branchPrefix", "session/")
    }

    pub fn base_branch(&self) -> String {
        str_or(self.cfg, "session.worktree.baseBranch", "main")
    }

    pub fn enforcement_enabled(&self) -> bool {
        bool_or(self.cfg, "session.worktree.enforcement.enabled", false)
    }

    /// Command names (e.g. `"evidence capture"`) whose mutating invocations
    /// must run inside the pinned worktree.
    pub fn enforced_commands(&self) -> Vec<String> {
        optional_str_list(self.cfg, "session.worktree.enforcement.commands").unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
