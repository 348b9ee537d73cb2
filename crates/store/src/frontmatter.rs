// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML frontmatter codec for entity and evidence files.
//!
//! A document is a `---` delimited YAML block followed by a markdown body.
//! Parsing tolerates a missing trailing newline; the BOM is handled by
//! [`crate::fsio::read_text`]. Serialization always emits a trailing
//! newline.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Split a document into its raw YAML header and body.
///
/// Returns `None` when the text does not start with a `---` line or the
/// closing delimiter is missing.
pub fn split(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;
    // Closing delimiter: a line that is exactly `---`.
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            let body = body.strip_prefix('\n').unwrap_or(body);
            return Some((header, body));
        }
        offset += line.len();
    }
    // Unterminated header, unless the final line is exactly `---` without a
    // trailing newline (handled above via split_inclusive).
    None
}

/// Parse frontmatter into `T`, returning `(front, body)`.
pub fn parse<T: DeserializeOwned>(text: &str) -> Result<(T, String), String> {
    let (header, body) = split(text).ok_or_else(|| {
        "missing --- delimited YAML frontmatter".to_string()
    })?;
    let front: T = serde_yaml::from_str(header).map_err(|e| e.to_string())?;
    Ok((front, body.to_string()))
}

/// Render frontmatter plus body.
pub fn render<T: Serialize>(front: &T, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(front)?;
    let body = body.trim_end_matches('\n');
    if body.is_empty() {
        Ok(format!("---\n{yaml}---\n"))
    } else {
        Ok(format!("---\n{yaml}---\n\n{body}\n"))
    }
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
