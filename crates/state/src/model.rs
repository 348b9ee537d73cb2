// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative transition model loaded from the workflow config.

use crate::error::StateError;
use edison_config::{StateSpec, TransitionSpec, WorkflowConfig};
use std::collections::BTreeMap;

/// Transition tables for one entity type.
#[derive(Debug, Clone, Default)]
pub struct EntityModel {
    pub states: BTreeMap<String, StateSpec>,
}

impl EntityModel {
    /// The `(from, to)` transition entry, if declared.
    pub fn transition(&self, from: &str, to: &str) -> Option<&TransitionSpec> {
        self.states
            .get(from)?
            .transitions
            .iter()
            .find(|t| t.to == to)
    }

    pub fn is_terminal(&self, state: &str) -> bool {
        self.states.get(state).map(|s| s.terminal).unwrap_or(false)
    }
}

/// Models for every entity type the machine drives.
#[derive(Debug, Clone, Default)]
pub struct WorkflowModel {
    pub task: EntityModel,
    pub qa: EntityModel,
    pub session: EntityModel,
}

impl WorkflowModel {
    pub fn load(workflow: &WorkflowConfig<'_>) -> Result<Self, StateError> {
        Ok(Self {
            task: load_entity(workflow, "task")?,
            qa: load_entity(workflow, "qa")?,
            session: load_entity(workflow, "session")?,
        })
    }

    pub fn entity(&self, entity: &str) -> &EntityModel {
        match entity {
            "qa" => &self.qa,
            "session" => &self.session,
            _ => &self.task,
        }
    }
}

fn load_entity(workflow: &WorkflowConfig<'_>, entity: &str) -> Result<EntityModel, StateError> {
    let states = workflow
        .states(entity)?
        .into_iter()
        .map(|s| (s.name.clone(), s))
        .collect();
    Ok(EntityModel { states })
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
