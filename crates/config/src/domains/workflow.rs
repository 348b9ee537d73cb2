// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow domain: semantic states, state directories, transition tables.
//!
//! `workflow.{entity}.states` is the single source of truth for the
//! `state → dirname` map and for the declarative transition tables the
//! state machine loads.

use crate::error::ConfigError;
use crate::value::{lookup, require_str};
use serde::Deserialize;
use serde_yaml::Value;

/// One allowed transition out of a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSpec {
    pub to: String,
    #[serde(default)]
    pub guards: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// One configured state with its directory and transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSpec {
    #[serde(skip)]
    pub name: String,
    pub dir: String,
    #[serde(default)]
    pub initial: bool,
    #[serde(default, rename = "final")]
    pub terminal: bool,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

fn strip_markers(list: &mut Vec<String>) {
    list.retain(|s| s != "+" && s != "=" && s != "-");
}

/// Read-through view of `workflow.*`.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowConfig<'a> {
    cfg: &'a Value,
}

impl<'a> WorkflowConfig<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    /// Resolve a semantic state key (`todo`, `wip`, …) to the configured
    /// on-disk state name for an entity type.
    pub fn semantic_state(&self, entity: &str, semantic: &str) -> Result<String, ConfigError> {
        require_str(self.cfg, &format!("workflow.{entity}.semantics.{semantic}"))
    }

    /// Directory name for a state.
    pub fn state_dir(&self, entity: &str, state: &str) -> Result<String, ConfigError> {
        require_str(self.cfg, &format!("workflow.{entity}.states.{state}.dir"))
    }

    /// All configured states for an entity, in declaration order.
    pub fn states(&self, entity: &str) -> Result<Vec<StateSpec>, ConfigError> {
        let key = format!("workflow.{entity}.states");
        let map = lookup(self.cfg, &key)
            .and_then(Value::as_mapping)
            .ok_or_else(|| ConfigError::MissingKey { key: key.clone() })?;
        let mut out = Vec::new();
        for (name, value) in map {
            let name = name.as_str().ok_or_else(|| ConfigError::InvalidType {
                key: key.clone(),
                expected: "string state names",
            })?;
            let mut spec: StateSpec =
                serde_yaml::from_value(value.clone()).map_err(|_| ConfigError::InvalidType {
                    key: format!("{key}.{name}"),
                    expected: "state spec mapping",
                })?;
            spec.name = name.to_string();
            for t in &mut spec.transitions {
                strip_markers(&mut t.guards);
                strip_markers(&mut t.actions);
            }
            out.push(spec);
        }
        Ok(out)
    }

    /// One state spec by name.
    pub fn state(&self, entity: &str, name: &str) -> Result<StateSpec, ConfigError> {
        self.states(entity)?
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::MissingKey {
                key: format!("workflow.{entity}.states.{name}"),
            })
    }

    /// The configured initial state for an entity.
    pub fn initial_state(&self, entity: &str) -> Result<String, ConfigError> {
        self.states(entity)?
            .into_iter()
            .find(|s| s.initial)
            .map(|s| s.name)
            .ok_or_else(|| ConfigError::MissingKey {
                key: format!("workflow.{entity}.states.*.initial"),
            })
    }

    /// `(state, dir)` pairs for every configured state.
    pub fn state_dirs(&self, entity: &str) -> Result<Vec<(String, String)>, ConfigError> {
        Ok(self
            .states(entity)?
            .into_iter()
            .map(|s| (s.name, s.dir))
            .collect())
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
