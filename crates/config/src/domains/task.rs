// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task domain: readiness policy and similarity weights.

use crate::domains::workflow::WorkflowConfig;
use crate::error::ConfigError;
use crate::value::{bool_or, f64_or, require_str_list, u64_or};
use edison_core::{ReadinessPolicy, SimilarityWeights};
use serde_yaml::Value;

/// Read-through view of `tasks.*`.
#[derive(Debug, Clone, Copy)]
pub struct TaskConfig<'a> {
    cfg: &'a Value,
}

impl<'a> TaskConfig<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    /// Readiness policy with semantic state keys resolved to on-disk names.
    ///
    /// `tasks.readiness.dependencySatisfiedStates` is required; unknown
    /// semantics in the list are skipped (fail-open for forward compat),
    /// but an empty resolved set is an error.
    pub fn readiness_policy(&self, workflow: &WorkflowConfig<'_>) -> Result<ReadinessPolicy, ConfigError> {
        let semantics = require_str_list(self.cfg, "tasks.readiness.dependencySatisfiedStates")?;
        let mut satisfied = Vec::new();
        for semantic in &semantics {
            if let Ok(state) = workflow.semantic_state("task", semantic) {
                satisfied.push(state);
            }
        }
        if satisfied.is_empty() {
            return Err(ConfigError::MissingKey {
                key: "tasks.readiness.dependencySatisfiedStates".to_string(),
            });
        }
        Ok(ReadinessPolicy {
            todo_state: workflow.semantic_state("task", "todo")?,
            satisfied_states: satisfied,
            missing_dependency_blocks: bool_or(
                self.cfg,
                "tasks.readiness.treatMissingDependencyAsBlocked",
                true,
            ),
        })
    }

    /// Similarity weights with documented defaults.
    pub fn similarity_weights(&self) -> SimilarityWeights {
        SimilarityWeights {
            shingle_size: u64_or(self.cfg, "tasks.similarity.shingleSize", 3) as usize,
            title_weight: f64_or(self.cfg, "tasks.similarity.titleWeight", 0.6),
            body_weight: f64_or(self.cfg, "tasks.similarity.bodyWeight", 0.4),
            use_shingles: bool_or(self.cfg, "tasks.similarity.useShingles", false),
            threshold: f64_or(self.cfg, "tasks.similarity.threshold", 0.55),
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
