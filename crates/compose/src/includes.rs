// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Include directive resolution with cycle detection.
//!
//! Directives:
//! - `{{include:path}}`: required, error when missing.
//! - `{{include-optional:path}}`: silently skipped when missing.
//! - `{{include-section:path#anchor}}`: only the anchored span.
//!
//! Directives inside fenced code blocks or inline code spans are
//! preserved literally so documentation examples survive composition.

use crate::error::ComposeError;
use crate::scan::{is_fence_line, split_inline_code};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn directive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        match Regex::new(r"\{\{\s*include(?<kind>-optional|-section)?:(?<target>[^}]+)\}\}") {
            Ok(re) => re,
            // The pattern is a compile-time constant.
            Err(_) => unreachable!("directive regex is valid"),
        }
    })
}

/// Resolver bound to one project root.
pub struct IncludeResolver {
    project_root: PathBuf,
    project_config_dir: PathBuf,
    max_depth: usize,
}

impl IncludeResolver {
    pub fn new(project_root: &Path, max_depth: usize) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            project_config_dir: project_root.join(edison_config::PROJECT_CONFIG_DIR),
            max_depth,
        }
    }

    /// Expand every directive in `content` relative to `base_file`.
    ///
    /// Returns the expanded text and the dependency files in resolution
    /// order. Running the result through the resolver again is a no-op:
    /// expanded text contains no directives outside code spans.
    pub fn resolve(
        &self,
        content: &str,
        base_file: &Path,
    ) -> Result<(String, Vec<PathBuf>), ComposeError> {
        let mut deps = Vec::new();
        let mut stack = Vec::new();
        let expanded = self.resolve_inner(content, base_file, 0, &mut stack, &mut deps)?;
        Ok((expanded, deps))
    }

    fn resolve_inner(
        &self,
        content: &str,
        base_file: &Path,
        depth: usize,
        stack: &mut Vec<PathBuf>,
        deps: &mut Vec<PathBuf>,
    ) -> Result<String, ComposeError> {
        let mut out = String::with_capacity(content.len());
        let mut in_fence = false;

        for line in content.split_inclusive('\n') {
            let bare = line.strip_suffix('\n').unwrap_or(line);
            if is_fence_line(bare) {
                in_fence = !in_fence;
                out.push_str(line);
                continue;
            }
            if in_fence || !bare.contains("{{") {
                out.push_str(line);
                continue;
            }
            for (segment, is_code) in split_inline_code(bare) {
                if is_code {
                    out.push_str(segment);
                } else {
                    out.push_str(&self.expand_segment(segment, base_file, depth, stack, deps)?);
                }
            }
            if line.ends_with('\n') {
                out.push('\n');
            }
        }
        Ok(out)
    }

    fn expand_segment(
        &self,
        segment: &str,
        base_file: &Path,
        depth: usize,
        stack: &mut Vec<PathBuf>,
        deps: &mut Vec<PathBuf>,
    ) -> Result<String, ComposeError> {
        let re = directive_re();
        let mut out = String::with_capacity(segment.len());
        let mut last = 0;
        for caps in re.captures_iter(segment) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&segment[last..whole.start()]);
            last = whole.end();

            if depth > self.max_depth {
                return Err(ComposeError::DepthExceeded {
                    max_depth: self.max_depth,
                    base: base_file.to_path_buf(),
                });
            }

            let kind = caps.name("kind").map(|m| m.as_str()).unwrap_or("");
            let raw_target = caps.name("target").map(|m| m.as_str()).unwrap_or("").trim();
            let (raw_path, anchor) = match kind {
                "-section" => match raw_target.split_once('#') {
                    Some((p, a)) => (p.trim(), Some(a.trim())),
                    None => (raw_target, None),
                },
                _ => (raw_target, None),
            };
            let target = self.normalize(raw_path, base_file);

            let text = match std::fs::read_to_string(&target) {
                Ok(text) => text,
                Err(_) if kind == "-optional" => continue,
                Err(_) => {
                    return Err(ComposeError::MissingInclude {
                        target,
                        base: base_file.to_path_buf(),
                    })
                }
            };

            let canonical = target.canonicalize().unwrap_or_else(|_| target.clone());
            if stack.contains(&canonical) {
                let chain: Vec<String> = stack
                    .iter()
                    .chain(std::iter::once(&canonical))
                    .map(|p| p.display().to_string())
                    .collect();
                return Err(ComposeError::CircularInclude {
                    chain: chain.join(" -> "),
                });
            }
            deps.push(target.clone());

            let text = match anchor {
                Some(anchor) => extract_anchor(&text, anchor).ok_or_else(|| {
                    ComposeError::InvalidAnchor {
                        anchor: anchor.to_string(),
                        path: target.clone(),
                    }
                })?,
                None => text,
            };

            stack.push(canonical);
            let expanded = self.resolve_inner(&text, &target, depth + 1, stack, deps)?;
            stack.pop();
            out.push_str(expanded.trim_end_matches('\n'));
        }
        out.push_str(&segment[last..]);
        Ok(out)
    }

    /// Path normalization:
    /// - leading `/` ⟹ project-root-absolute
    /// - `project/` or `.edison/` prefixes ⟹ project config dir
    /// - `packs/…` ⟹ active project config dir
    /// - otherwise relative to the including file.
    fn normalize(&self, raw: &str, base_file: &Path) -> PathBuf {
        let raw = raw.trim().trim_matches('"').trim_matches('\'');
        if let Some(rest) = raw.strip_prefix('/') {
            return self.project_root.join(rest);
        }
        if let Some(rest) = raw.strip_prefix("project/") {
            return self.project_config_dir.join(rest);
        }
        let config_prefix = format!("{}/", edison_config::PROJECT_CONFIG_DIR);
        if let Some(rest) = raw.strip_prefix(&config_prefix) {
            return self.project_config_dir.join(rest);
        }
        if raw.starts_with("packs/") {
            return self.project_config_dir.join(raw);
        }
        base_file
            .parent()
            .unwrap_or(&self.project_root)
            .join(raw)
    }
}

/// Content between `<!-- ANCHOR: name -->` and `<!-- END ANCHOR: name -->`.
pub fn extract_anchor(text: &str, anchor: &str) -> Option<String> {
    let open = format!("<!-- ANCHOR: {anchor} -->");
    let close = format!("<!-- END ANCHOR: {anchor} -->");
    let start = text.find(&open)? + open.len();
    let end = text[start..].find(&close)? + start;
    Some(text[start..end].trim_matches('\n').to_string())
}

#[cfg(test)]
#[path = "includes_tests.rs"]
mod tests;
