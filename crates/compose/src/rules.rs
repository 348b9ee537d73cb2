// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rules catalog composition and injection rendering.
//!
//! Each layer contributes a `rules/registry.yml`; merging is id-keyed.
//! Scalars resolve higher-layer-wins, nested `config` deep-merges, and a
//! rule is blocking if any layer marks it so.

use crate::error::ComposeError;
use edison_config::value::deep_merge;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Max characters of rule body rendered into injection text.
const INJECTION_BODY_LIMIT: usize = 1000;

/// Anchored source location of a rule's long-form guidance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSource {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

/// One rule definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub blocking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RuleSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "serde_yaml::Mapping::is_empty")]
    pub config: serde_yaml::Mapping,
}

/// Registry file shape: `rules: [RuleDef, …]`.
#[derive(Debug, Clone, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    rules: Vec<RuleDef>,
}

/// Parse one layer's registry file.
pub fn parse_registry(path: &Path, content: &str) -> Result<Vec<RuleDef>, ComposeError> {
    let file: RegistryFile =
        serde_yaml::from_str(content).map_err(|e| ComposeError::MalformedRegistry {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(file.rules)
}

/// Merge rule layers low → high.
pub fn merge_rules(layers: &[Vec<RuleDef>]) -> Vec<RuleDef> {
    let mut merged: BTreeMap<String, RuleDef> = BTreeMap::new();
    for layer in layers {
        for rule in layer {
            match merged.get_mut(&rule.id) {
                None => {
                    merged.insert(rule.id.clone(), rule.clone());
                }
                Some(existing) => {
                    // Higher layer wins scalars; blocking is sticky once any
                    // layer sets it; nested config deep-merges.
                    let blocking = existing.blocking || rule.blocking;
                    let config = deep_merge(
                        serde_yaml::Value::Mapping(existing.config.clone()),
                        serde_yaml::Value::Mapping(rule.config.clone()),
                    );
                    let mut updated = rule.clone();
                    updated.blocking = blocking;
                    if updated.title.is_empty() {
                        updated.title = existing.title.clone();
                    }
                    if updated.category.is_empty() {
                        updated.category = existing.category.clone();
                    }
                    if updated.guidance.is_none() {
                        updated.guidance = existing.guidance.clone();
                    }
                    if updated.source.is_none() {
                        updated.source = existing.source.clone();
                    }
                    if updated.priority.is_none() {
                        updated.priority = existing.priority;
                    }
                    updated.config = config.as_mapping().cloned().unwrap_or_default();
                    *existing = updated;
                }
            }
        }
    }
    let mut out: Vec<RuleDef> = merged.into_values().collect();
    // Priority descending, then id, for stable injection order.
    out.sort_by(|a, b| {
        b.priority
            .unwrap_or(0)
            .cmp(&a.priority.unwrap_or(0))
            .then_with(|| a.id.cmp(&b.id))
    });
    out
}

/// Rules applicable to a context/category filter.
pub fn rules_for_context<'r>(rules: &'r [RuleDef], category: Option<&str>) -> Vec<&'r RuleDef> {
    rules
        .iter()
        .filter(|r| category.map(|c| r.category == c).unwrap_or(true))
        .collect()
}

/// Render the injection text for one rule: header, title/priority line,
/// body truncated with an ellipsis.
pub fn render_injection(rule: &RuleDef, body: &str) -> String {
    let mut out = format!("## Rule: {}\n", rule.id);
    let marker = if rule.blocking { " [BLOCKING]" } else { "" };
    match rule.priority {
        Some(p) => out.push_str(&format!("{}{} (priority {})\n", rule.title, marker, p)),
        None => out.push_str(&format!("{}{}\n", rule.title, marker)),
    }
    let body = body.trim();
    if !body.is_empty() {
        out.push('\n');
        if body.chars().count() > INJECTION_BODY_LIMIT {
            let truncated: String = body.chars().take(INJECTION_BODY_LIMIT).collect();
            out.push_str(&truncated);
            out.push('…');
        } else {
            out.push_str(body);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
