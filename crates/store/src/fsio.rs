// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem primitives: atomic writes and tolerant reads.
//!
//! Writes land in a temp file in the destination directory and are renamed
//! into place, so readers observe either the old or the new content, never
//! a torn file.

use std::io::Write;
use std::path::Path;

/// Atomically write `content` to `path` (temp file + rename).
pub fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile_in(dir)?;
    tmp.file.write_all(content)?;
    tmp.file.sync_all()?;
    std::fs::rename(&tmp.path, path)?;
    tmp.persisted = true;
    Ok(())
}

/// Read a text file, tolerating a UTF-8 BOM and a missing trailing newline.
pub fn read_text(path: &Path) -> std::io::Result<String> {
    let raw = std::fs::read_to_string(path)?;
    Ok(raw.strip_prefix('\u{feff}').unwrap_or(&raw).to_string())
}

struct TempFile {
    path: std::path::PathBuf,
    file: std::fs::File,
    persisted: bool,
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

fn tempfile_in(dir: &Path) -> std::io::Result<TempFile> {
    // Process id + counter keeps concurrent writers in one dir distinct.
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = dir.join(format!(".tmp-{}-{n}", std::process::id()));
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)?;
    Ok(TempFile {
        path,
        file,
        persisted: false,
    })
}

#[cfg(test)]
#[path = "fsio_tests.rs"]
mod tests;
