// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree enforcement for mutating commands.
//!
//! When enabled, commands listed in `session.worktree.enforcement.commands`
//! must run from inside the session's pinned worktree. Invocations from the
//! primary checkout are allowed; anywhere else is blocked with exit code 2.

use crate::error::EngineError;
use crate::workspace::Workspace;
use edison_core::Session;
use std::path::Path;

/// Check a mutating invocation against the enforcement policy.
///
/// `command_path` is the space-joined command name, e.g. `"evidence capture"`.
pub fn check_worktree_enforcement(
    ws: &Workspace,
    session: &Session,
    command_path: &str,
    cwd: &Path,
) -> Result<(), EngineError> {
    let cfg = ws.session_config();
    if !cfg.enforcement_enabled() {
        return Ok(());
    }
    let enforced = cfg.enforced_commands();
    if !enforced.iter().any(|c| c == command_path) {
        return Ok(());
    }
    let Some(worktree) = &session.git.worktree_path else {
        return Ok(()); // nothing pinned, nothing to enforce
    };

    if is_within(cwd, worktree) || is_within(cwd, ws.root()) {
        return Ok(());
    }

    let archived = ws
        .resolver()
        .session_recovery_dir(session.id.as_str())
        .join("worktree");
    Err(EngineError::WorktreeEnforcement {
        session_id: session.id.to_string(),
        worktree: worktree.clone(),
        archived_worktree: archived.is_dir().then_some(archived),
    })
}

fn is_within(path: &Path, base: &Path) -> bool {
    let canonical_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let canonical_base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
    canonical_path.starts_with(&canonical_base)
}

#[cfg(test)]
#[path = "enforcement_tests.rs"]
mod tests;
