// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SECTION-mode layered composition.
//!
//! Source files anchor named slots with `<!-- SECTION: name -->` …
//! `<!-- /SECTION: name -->`. Higher layers replace a slot by declaring
//! the same SECTION, or append to it with `EXTEND` markers. Unbalanced
//! markers are fatal.

use crate::error::ComposeError;
use std::collections::BTreeMap;
use std::path::Path;

/// Operations a layer file may declare.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SlotOp {
    Replace(String),
    Extend(String),
}

/// Parse `<name, body>` spans for a marker pair (`SECTION` or `EXTEND`).
fn parse_spans(
    content: &str,
    marker: &str,
    path: &Path,
) -> Result<Vec<(String, String)>, ComposeError> {
    let open_prefix = format!("<!-- {marker}: ");
    let close_prefix = format!("<!-- /{marker}: ");
    let mut spans = Vec::new();
    let mut open: Option<(String, Vec<String>)> = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(&open_prefix) {
            let name = rest.trim_end_matches("-->").trim().to_string();
            if open.is_some() {
                return Err(ComposeError::UnbalancedSection {
                    name,
                    path: path.to_path_buf(),
                });
            }
            open = Some((name, Vec::new()));
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix(&close_prefix) {
            let name = rest.trim_end_matches("-->").trim().to_string();
            match open.take() {
                Some((open_name, body)) if open_name == name => {
                    spans.push((open_name, body.join("\n")));
                }
                _ => {
                    return Err(ComposeError::UnbalancedSection {
                        name,
                        path: path.to_path_buf(),
                    })
                }
            }
            continue;
        }
        if let Some((_, body)) = &mut open {
            body.push(line.to_string());
        }
    }
    if let Some((name, _)) = open {
        return Err(ComposeError::UnbalancedSection {
            name,
            path: path.to_path_buf(),
        });
    }
    Ok(spans)
}

/// Compose a base document with overlay layers (low → high).
///
/// The base document's section markers stay in place; overlay layers only
/// contribute SECTION (replace) and EXTEND (append) bodies.
pub fn compose_sections(
    base: &str,
    base_path: &Path,
    overlays: &[(String, &Path)],
) -> Result<String, ComposeError> {
    // Validate the base's markers up front.
    parse_spans(base, "SECTION", base_path)?;

    let mut ops: BTreeMap<String, Vec<SlotOp>> = BTreeMap::new();
    for (content, path) in overlays {
        for (name, body) in parse_spans(content, "SECTION", path)? {
            ops.entry(name).or_default().push(SlotOp::Replace(body));
        }
        for (name, body) in parse_spans(content, "EXTEND", path)? {
            ops.entry(name).or_default().push(SlotOp::Extend(body));
        }
    }

    let mut out = String::new();
    let mut current: Option<(String, Vec<String>)> = None;
    for line in base.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("<!-- SECTION: ") {
            let name = rest.trim_end_matches("-->").trim().to_string();
            out.push_str(line);
            out.push('\n');
            current = Some((name, Vec::new()));
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("<!-- /SECTION: ") {
            let _ = rest;
            if let Some((name, body)) = current.take() {
                let mut rendered = body.join("\n");
                for op in ops.get(&name).into_iter().flatten() {
                    match op {
                        SlotOp::Replace(replacement) => rendered = replacement.clone(),
                        SlotOp::Extend(extra) => {
                            if !rendered.is_empty() && !extra.is_empty() {
                                rendered.push('\n');
                            }
                            rendered.push_str(extra);
                        }
                    }
                }
                if !rendered.is_empty() {
                    out.push_str(&rendered);
                    out.push('\n');
                }
            }
            out.push_str(line);
            out.push('\n');
            continue;
        }
        match &mut current {
            Some((_, body)) => body.push(line.to_string()),
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "sections_tests.rs"]
mod tests;
