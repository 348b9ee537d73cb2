// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output rendering.
//!
//! Every command accepts `--format {markdown,yaml,text,json}` with
//! `--json` as a back-compat alias. Defaults are never JSON: LLM-facing
//! output defaults to markdown, config output to yaml.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Yaml,
    Text,
    Json,
}

/// Resolve the effective format from the global flags and a per-command
/// default.
pub fn effective_format(
    format: Option<OutputFormat>,
    json_alias: bool,
    default: OutputFormat,
) -> OutputFormat {
    if let Some(format) = format {
        return format;
    }
    if json_alias {
        return OutputFormat::Json;
    }
    default
}

/// Render a serialisable payload in the requested format.
///
/// `markdown` receives a pre-rendered human view; structured formats use
/// the payload itself.
pub fn render<T: Serialize>(
    format: OutputFormat,
    payload: &T,
    markdown: impl FnOnce() -> String,
) -> String {
    match format {
        OutputFormat::Markdown => markdown(),
        OutputFormat::Text => markdown(),
        OutputFormat::Json => serde_json::to_string_pretty(payload)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":\"{e}\"}}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(payload).unwrap_or_else(|e| format!("error: {e}"))
        }
    }
}

/// A bullet list section, omitted entirely when empty.
pub fn md_section(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = format!("## {title}\n\n");
    for item in items {
        out.push_str("- ");
        out.push_str(item);
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Action-oriented fix line for markdown error output.
pub fn md_fix_line(fix: &str) -> String {
    format!("  Fix: `{fix}`\n")
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
