// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! QA domain: required evidence and configured CI commands.

use crate::value::{lookup, optional_str_list};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Read-through view of `qa.*`.
#[derive(Debug, Clone, Copy)]
pub struct QaConfig<'a> {
    cfg: &'a Value,
}

impl<'a> QaConfig<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    /// Evidence filenames a round must contain before a task may leave wip.
    pub fn required_evidence(&self) -> Vec<String> {
        optional_str_list(self.cfg, "qa.evidence.requiredEvidence").unwrap_or_default()
    }

    /// Configured CI commands keyed by short name (`test`, `lint`, …).
    ///
    /// Used to render actionable "Fix:" lines when command evidence is
    /// missing or failing.
    pub fn ci_commands(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        if let Some(map) =
            lookup(self.cfg, "qa.evidence.ciCommands").and_then(Value::as_mapping)
        {
            for (k, v) in map {
                if let (Some(k), Some(v)) = (k.as_str(), v.as_str()) {
                    out.insert(k.to_string(), v.to_string());
                }
            }
        }
        out
    }

    /// The configured command for one evidence name, if any.
    pub fn ci_command(&self, name: &str) -> Option<String> {
        let mut commands = self.ci_commands();
        commands.remove(name)
    }
}

#[cfg(test)]
#[path = "qa_tests.rs"]
mod tests;
