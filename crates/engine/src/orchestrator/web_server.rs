// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional web-server lifecycle around a validator dispatch.
//!
//! Probe the healthcheck URL first; when unreachable and `ensureRunning`
//! is set, start the configured command in its own process group, poll
//! until healthy or the startup timeout elapses, and tear the server down
//! afterwards (SIGTERM, then SIGKILL) if we started it.

use crate::error::EngineError;
use crate::resilience::scaled;
use edison_config::WebServerSpec;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// A server started by the guard, carrying its process group for teardown.
pub struct StartedServer {
    child: tokio::process::Child,
    shutdown_timeout: Duration,
}

/// Probe result + teardown handle for the validator run.
pub enum WebServerGuard {
    /// Server was already reachable; nothing to tear down.
    AlreadyRunning,
    /// We started it; terminate after the validator completes.
    Started(StartedServer),
    /// No web server declared.
    None,
}

/// Any HTTP-ish response counts as reachable: connect, send a GET, and
/// accept any bytes back.
pub async fn probe(url: &str, timeout: Duration) -> bool {
    let Some((host_port, path)) = split_url(url) else {
        return false;
    };
    let attempt = async {
        let mut stream = tokio::net::TcpStream::connect(&host_port).await.ok()?;
        let host = host_port.split(':').next().unwrap_or(&host_port);
        let request = format!("GET {path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.ok()?;
        let mut buf = [0u8; 64];
        use tokio::io::AsyncReadExt;
        let n = stream.read(&mut buf).await.ok()?;
        (n > 0).then_some(())
    };
    tokio::time::timeout(timeout, attempt).await.ok().flatten().is_some()
}

/// `http://host:port/path` → (`host:port`, `/path`).
fn split_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))?;
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let host_port = if authority.contains(':') {
        authority.to_string()
    } else {
        format!("{authority}:80")
    };
    Some((host_port, path.to_string()))
}

/// Ensure the validator's web server is reachable per its spec.
pub async fn ensure(spec: &WebServerSpec, validator_id: &str) -> Result<WebServerGuard, EngineError> {
    let probe_timeout = scaled(Duration::from_secs(2));
    if probe(spec.probe_url(), probe_timeout).await {
        return Ok(WebServerGuard::AlreadyRunning);
    }
    if !spec.ensure_running {
        return Ok(WebServerGuard::None);
    }
    let Some(start_command) = &spec.start_command else {
        return Err(EngineError::WebServerUnhealthy {
            validator: validator_id.to_string(),
            timeout_secs: 0,
        });
    };

    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c").arg(start_command);
    // Own process group so teardown reaches every descendant.
    #[cfg(unix)]
    cmd.process_group(0);
    let child = cmd.spawn().map_err(|source| EngineError::Io {
        path: std::path::PathBuf::from(start_command),
        source,
    })?;
    let started = StartedServer {
        child,
        shutdown_timeout: scaled(Duration::from_secs(spec.shutdown_timeout_seconds)),
    };

    let deadline =
        tokio::time::Instant::now() + scaled(Duration::from_secs(spec.startup_timeout_seconds));
    loop {
        if probe(spec.probe_url(), probe_timeout).await {
            return Ok(WebServerGuard::Started(started));
        }
        if tokio::time::Instant::now() >= deadline {
            started.terminate().await;
            return Err(EngineError::WebServerUnhealthy {
                validator: validator_id.to_string(),
                timeout_secs: spec.startup_timeout_seconds,
            });
        }
        tokio::time::sleep(scaled(Duration::from_millis(250))).await;
    }
}

impl WebServerGuard {
    /// Tear down a server this guard started; no-op otherwise.
    pub async fn teardown(self) {
        if let WebServerGuard::Started(server) = self {
            server.terminate().await;
        }
    }
}

impl StartedServer {
    async fn terminate(mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;
            if let Some(pid) = self.child.id() {
                let pgid = Pid::from_raw(pid as i32);
                let _ = killpg(pgid, Signal::SIGTERM);
                let graceful = tokio::time::timeout(self.shutdown_timeout, self.child.wait()).await;
                if graceful.is_err() {
                    let _ = killpg(pgid, Signal::SIGKILL);
                    let _ = self.child.wait().await;
                }
                return;
            }
        }
        let _ = self.child.kill().await;
    }
}

#[cfg(test)]
#[path = "web_server_tests.rs"]
mod tests;
