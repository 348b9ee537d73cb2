// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory per-path file locks.
//!
//! A lock is a `{path}.lock` file created exclusively and held with an OS
//! advisory lock (fs2). Acquisition polls up to a timeout; each attempt
//! first reaps stale lock files older than the configured max age so a
//! crashed process cannot wedge an entity forever.

use crate::error::StoreError;
use fs2::FileExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Lock tuning knobs.
#[derive(Debug, Clone)]
pub struct LockConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Lock files older than this are presumed abandoned and reaped.
    pub max_age: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
            max_age: Duration::from_secs(300),
        }
    }
}

/// A held advisory lock; released (and the lock file removed) on drop.
#[derive(Debug)]
pub struct PathLock {
    lock_path: PathBuf,
    file: Option<std::fs::File>,
}

impl PathLock {
    /// Lock file path guarding `target`.
    pub fn lock_path_for(target: &Path) -> PathBuf {
        let mut name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.push_str(".lock");
        target.with_file_name(name)
    }

    /// Acquire the lock guarding `target`, blocking up to the timeout.
    pub fn acquire(target: &Path, cfg: &LockConfig) -> Result<Self, StoreError> {
        let lock_path = Self::lock_path_for(target);
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let deadline = Instant::now() + cfg.timeout;
        loop {
            reap_if_stale(&lock_path, cfg.max_age);
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(file) => {
                    if file.try_lock_exclusive().is_ok() {
                        return Ok(Self {
                            lock_path,
                            file: Some(file),
                        });
                    }
                    // Another process beat us to the OS lock; treat as busy.
                    let _ = std::fs::remove_file(&lock_path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(source) => {
                    return Err(StoreError::Io {
                        path: lock_path,
                        source,
                    })
                }
            }
            if Instant::now() >= deadline {
                return Err(StoreError::LockTimeout { path: lock_path });
            }
            std::thread::sleep(cfg.poll_interval);
        }
    }
}

impl Drop for PathLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = fs2::FileExt::unlock(&file);
        }
        let _ = std::fs::remove_file(&self.lock_path);
    }
}

fn reap_if_stale(lock_path: &Path, max_age: Duration) {
    let Ok(meta) = std::fs::metadata(lock_path) else {
        return;
    };
    let age = meta
        .modified()
        .ok()
        .and_then(|m| SystemTime::now().duration_since(m).ok());
    if let Some(age) = age {
        if age > max_age {
            tracing::warn!(path = %lock_path.display(), ?age, "reaping stale lock file");
            let _ = std::fs::remove_file(lock_path);
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
