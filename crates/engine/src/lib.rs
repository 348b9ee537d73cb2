// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! edison-engine: Orchestration over the core stores.
//!
//! Hosts the workspace context (explicit services instead of process-wide
//! state), the validation orchestrator, the session manager with its
//! journalled close, the session-next planner, the git capability, and
//! retry/timeout resilience helpers.

pub mod error;
pub mod git;
pub mod integrity;
pub mod next;
pub mod orchestrator;
pub mod resilience;
pub mod session;
pub mod workspace;

pub use error::EngineError;
pub use git::{Git, ShellGit, ENV_ALLOW_DESTRUCTIVE_GIT};
pub use integrity::{verify_workspace, IntegrityReport};
pub use next::{compute_next, NextAction, NextPlan};
pub use orchestrator::{RunOptions, ValidationOrchestrator, ValidationRun};
pub use session::{
    check_worktree_enforcement, infer_session_id, resolve_session_id, CloseReport, CreateOutcome,
    SessionManager,
};
pub use workspace::Workspace;
