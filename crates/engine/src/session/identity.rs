// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identity resolution.
//!
//! Precedence: explicit id → worktree pin file → `AGENTS_SESSION` →
//! process-tree inference. Inference walks the ancestor chain and derives
//! `{topmost_known_agent_name}-pid-{pid}`, falling back to the current
//! process, so two agents in one repo get distinct ids automatically.
//! Existing sessions are never renamed.

use edison_config::{PathResolver, ENV_SESSION};
use edison_core::{IdError, SessionId};
use std::path::Path;

/// One process in the ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
}

/// Current process upward to init. Best-effort: on platforms without
/// `/proc`, only the current process is returned.
pub fn process_chain() -> Vec<ProcessInfo> {
    let mut chain = Vec::new();
    let mut pid = std::process::id();
    // Bounded walk to defend against ppid loops.
    for _ in 0..64 {
        let Some(info) = read_process(pid) else { break };
        let ppid = info.ppid;
        chain.push(info);
        if ppid <= 1 {
            break;
        }
        pid = ppid;
    }
    if chain.is_empty() {
        chain.push(ProcessInfo {
            pid: std::process::id(),
            ppid: 0,
            name: current_process_name(),
        });
    }
    chain
}

fn current_process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "edison".to_string())
}

#[cfg(target_os = "linux")]
fn read_process(pid: u32) -> Option<ProcessInfo> {
    let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    // `pid (comm) state ppid …`; comm may contain spaces/parens, so split
    // on the last closing paren.
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    let name = stat.get(open + 1..close)?.to_string();
    let rest = stat.get(close + 1..)?;
    let ppid: u32 = rest.split_whitespace().nth(1)?.parse().ok()?;
    Some(ProcessInfo { pid, ppid, name })
}

#[cfg(not(target_os = "linux"))]
fn read_process(pid: u32) -> Option<ProcessInfo> {
    let output = std::process::Command::new("ps")
        .args(["-o", "ppid=,comm=", "-p", &pid.to_string()])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout);
    let line = text.trim();
    let mut parts = line.split_whitespace();
    let ppid: u32 = parts.next()?.parse().ok()?;
    let name = parts.collect::<Vec<_>>().join(" ");
    let name = Path::new(&name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(name);
    if name.is_empty() {
        return None;
    }
    Some(ProcessInfo { pid, ppid, name })
}

/// Derive a session id from the process tree.
///
/// Picks the topmost ancestor whose name matches the known-agent set
/// (source-configured, not built-in), else the current process.
pub fn infer_session_id(known_agents: &[String]) -> Result<SessionId, IdError> {
    let chain = process_chain();
    infer_from_chain(&chain, known_agents)
}

pub(crate) fn infer_from_chain(
    chain: &[ProcessInfo],
    known_agents: &[String],
) -> Result<SessionId, IdError> {
    let matched = chain
        .iter()
        .rev()
        .find(|p| known_agents.iter().any(|a| process_name_matches(&p.name, a)));
    let picked = matched.or_else(|| chain.first()).ok_or(IdError::Empty)?;
    SessionId::inferred(&picked.name, picked.pid)
}

fn process_name_matches(name: &str, agent: &str) -> bool {
    let name = name.to_lowercase();
    let agent = agent.to_lowercase();
    name == agent || name.starts_with(&format!("{agent}-")) || name.starts_with(&format!("{agent}."))
}

/// Full resolution with overrides (see module docs for precedence).
pub fn resolve_session_id(
    explicit: Option<&str>,
    cwd: &Path,
    known_agents: &[String],
) -> Result<SessionId, IdError> {
    if let Some(id) = explicit {
        return SessionId::sanitized(id);
    }
    // Pin file discovered by walking up from the CWD: zero-env resolution
    // from inside a worktree.
    for dir in cwd.ancestors() {
        if let Some(pinned) = PathResolver::read_pin(dir) {
            return SessionId::sanitized(pinned);
        }
    }
    if let Ok(id) = std::env::var(ENV_SESSION) {
        if !id.is_empty() {
            return SessionId::sanitized(id);
        }
    }
    infer_session_id(known_agents)
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
