// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transition pipeline.
//!
//! Resolve the `(from, to)` entry, evaluate all guards (collecting every
//! violation), run actions with compensation on failure, then append
//! history and persist; the store moves the file to the new state
//! directory as part of the save.

use crate::actions::ActionRegistry;
use crate::context::GuardContext;
use crate::env::WorkflowEnv;
use crate::error::{StateError, Violation};
use crate::guards::GuardRegistry;
use crate::model::WorkflowModel;
use edison_config::TransitionSpec;
use edison_core::{HistoryEntry, QaRecord, Session, Task};

pub struct StateMachine<'e> {
    model: WorkflowModel,
    guards: GuardRegistry,
    actions: ActionRegistry,
    env: &'e dyn WorkflowEnv,
}

impl<'e> StateMachine<'e> {
    pub fn new(model: WorkflowModel, env: &'e dyn WorkflowEnv) -> Self {
        Self {
            model,
            guards: GuardRegistry::builtin(),
            actions: ActionRegistry::builtin(),
            env,
        }
    }

    pub fn with_registries(
        model: WorkflowModel,
        guards: GuardRegistry,
        actions: ActionRegistry,
        env: &'e dyn WorkflowEnv,
    ) -> Self {
        Self {
            model,
            guards,
            actions,
            env,
        }
    }

    pub fn model(&self) -> &WorkflowModel {
        &self.model
    }

    // ----- task -----

    pub fn transition_task(
        &self,
        id: &str,
        to: &str,
        reason: Option<&str>,
    ) -> Result<Task, StateError> {
        let mut task = self
            .env
            .load_task(id)?
            .ok_or_else(|| StateError::NotFound { id: id.to_string() })?;
        let from = task.state.clone();
        let spec = self.resolve("task", id, &from, to)?.clone();

        let ctx = GuardContext::for_task(&task, &from, to);
        self.check_guards("task", &spec, &ctx)?;
        self.run_actions(&spec, &ctx, &from, to)?;

        let mut entry = HistoryEntry::new(from, to, self.env.now());
        if let Some(reason) = reason {
            entry = entry.with_reason(reason);
        }
        task.record_transition(entry);
        task.metadata.updated_at = self.env.now();
        self.env.save_task(&task)?;
        tracing::debug!(id, to, "task transition complete");
        Ok(task)
    }

    /// Guard preview without side effects: the violations `task claim` /
    /// `session next` would hit.
    pub fn preview_task(&self, id: &str, to: &str) -> Result<Vec<Violation>, StateError> {
        let task = self
            .env
            .load_task(id)?
            .ok_or_else(|| StateError::NotFound { id: id.to_string() })?;
        let from = task.state.clone();
        let spec = self.resolve("task", id, &from, to)?.clone();
        let ctx = GuardContext::for_task(&task, &from, to);
        Ok(self.evaluate_guards(&spec, &ctx))
    }

    // ----- qa -----

    pub fn transition_qa(
        &self,
        id: &str,
        to: &str,
        reason: Option<&str>,
    ) -> Result<QaRecord, StateError> {
        let mut qa = self
            .env
            .load_qa(id)?
            .ok_or_else(|| StateError::NotFound { id: id.to_string() })?;
        let from = qa.state.clone();
        let spec = self.resolve("qa", id, &from, to)?.clone();

        let ctx = GuardContext::for_qa(&qa, &from, to);
        self.check_guards("qa", &spec, &ctx)?;
        self.run_actions(&spec, &ctx, &from, to)?;

        let mut entry = HistoryEntry::new(from, to, self.env.now());
        if let Some(reason) = reason {
            entry = entry.with_reason(reason);
        }
        qa.record_transition(entry);
        qa.metadata.updated_at = self.env.now();
        self.env.save_qa(&qa)?;
        Ok(qa)
    }

    pub fn preview_qa(&self, id: &str, to: &str) -> Result<Vec<Violation>, StateError> {
        let qa = self
            .env
            .load_qa(id)?
            .ok_or_else(|| StateError::NotFound { id: id.to_string() })?;
        let from = qa.state.clone();
        let spec = self.resolve("qa", id, &from, to)?.clone();
        let ctx = GuardContext::for_qa(&qa, &from, to);
        Ok(self.evaluate_guards(&spec, &ctx))
    }

    // ----- session -----

    pub fn transition_session(
        &self,
        id: &str,
        to: &str,
        reason: Option<&str>,
    ) -> Result<Session, StateError> {
        let mut session = self
            .env
            .load_session(id)?
            .ok_or_else(|| StateError::NotFound { id: id.to_string() })?;
        let from = session.state.clone();
        let spec = self.resolve("session", id, &from, to)?.clone();

        let ctx = GuardContext::for_session(&session, &from, to);
        self.check_guards("session", &spec, &ctx)?;
        self.run_actions(&spec, &ctx, &from, to)?;

        let mut entry = HistoryEntry::new(from, to, self.env.now());
        if let Some(reason) = reason {
            entry = entry.with_reason(reason);
        }
        session.record_transition(entry);
        self.env.save_session(&session)?;
        Ok(session)
    }

    // ----- shared pipeline pieces -----

    fn resolve(
        &self,
        entity: &str,
        id: &str,
        from: &str,
        to: &str,
    ) -> Result<&TransitionSpec, StateError> {
        self.model
            .entity(entity)
            .transition(from, to)
            .ok_or_else(|| StateError::IllegalTransition {
                entity: entity.to_string(),
                id: id.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    fn evaluate_guards(&self, spec: &TransitionSpec, ctx: &GuardContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for name in &spec.guards {
            match self.guards.get(name) {
                Some(guard) => {
                    if !guard(ctx, self.env) {
                        violations.push(Violation {
                            guard: name.clone(),
                            details: GuardRegistry::details_for(name, ctx, self.env),
                        });
                    }
                }
                // Unknown guard: fail closed.
                None => violations.push(Violation {
                    guard: name.clone(),
                    details: vec!["unknown guard (not registered)".to_string()],
                }),
            }
        }
        violations
    }

    fn check_guards(
        &self,
        entity: &str,
        spec: &TransitionSpec,
        ctx: &GuardContext<'_>,
    ) -> Result<(), StateError> {
        let violations = self.evaluate_guards(spec, ctx);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(StateError::GuardFailed {
                entity: entity.to_string(),
                id: ctx.id.to_string(),
                from: ctx.from.to_string(),
                to: ctx.to.to_string(),
                violations,
            })
        }
    }

    fn run_actions(
        &self,
        spec: &TransitionSpec,
        ctx: &GuardContext<'_>,
        from: &str,
        to: &str,
    ) -> Result<(), StateError> {
        let mut executed = Vec::new();
        for name in &spec.actions {
            let Some(def) = self.actions.get(name) else {
                // Unknown action: fail before mutating anything further.
                self.compensate(&executed, ctx);
                return Err(StateError::ActionFailed {
                    action: name.clone(),
                    from: from.to_string(),
                    to: to.to_string(),
                    message: "unknown action (not registered)".to_string(),
                });
            };
            if let Err(e) = (def.run)(ctx, self.env) {
                self.compensate(&executed, ctx);
                return Err(StateError::ActionFailed {
                    action: name.clone(),
                    from: from.to_string(),
                    to: to.to_string(),
                    message: e.to_string(),
                });
            }
            executed.push(name.clone());
        }
        Ok(())
    }

    fn compensate(&self, executed: &[String], ctx: &GuardContext<'_>) {
        for name in executed.iter().rev() {
            if let Some(def) = self.actions.get(name) {
                if let Some(compensate) = def.compensate {
                    if let Err(e) = compensate(ctx, self.env) {
                        tracing::warn!(action = %name, error = %e, "compensating action failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
