// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation orchestrator: wave-sequenced validator execution with
//! fail-closed verdict aggregation and bundle summarisation.

pub mod engine_trait;
pub mod web_server;

pub use engine_trait::{DispatchRequest, DryRunEngine, ReportReaderEngine, ValidatorEngine};

use crate::error::EngineError;
use crate::workspace::Workspace;
use edison_state::ExpectedValidator;
use edison_store::{BundleSummary, EvidenceService, Tracking, ValidatorReport, Verdict};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Options for one validation run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Preset name; defaults to `validation.defaultPreset`.
    pub preset: Option<String>,
    /// Execute mode consumes real reports and writes the bundle; dry run
    /// records delegations and placeholder reports instead.
    pub execute: bool,
    pub sequential: Option<bool>,
    pub max_workers: Option<usize>,
    /// Extra validator ids appended to the expected set.
    pub add_validators: Vec<String>,
    /// Widen to the task hierarchy rooted at the given id.
    pub hierarchy: bool,
    /// Changed files from the session worktree diff.
    pub changed_files: Vec<String>,
}

/// Outcome of one wave.
#[derive(Debug, Clone)]
pub struct WaveOutcome {
    pub name: String,
    pub reports: Vec<ValidatorReport>,
    pub passed: bool,
}

/// Outcome of one task's validation run.
#[derive(Debug, Clone)]
pub struct ValidationRun {
    pub task_id: String,
    pub round: u32,
    pub preset: String,
    pub expected: Vec<ExpectedValidator>,
    pub waves: Vec<WaveOutcome>,
    /// Last executed wave when sequencing halted early, if any.
    pub stopped_after: Option<String>,
    pub bundle: Option<BundleSummary>,
}

impl ValidationRun {
    pub fn approved(&self) -> bool {
        self.bundle.as_ref().map(|b| b.approved).unwrap_or(false)
    }
}

pub struct ValidationOrchestrator<'w> {
    ws: &'w Workspace,
    engine: Arc<dyn ValidatorEngine>,
}

impl<'w> ValidationOrchestrator<'w> {
    /// Engine choice follows the execute flag: dry runs record
    /// delegations, execute consumes externally written reports.
    pub fn new(ws: &'w Workspace, execute: bool) -> Self {
        let engine: Arc<dyn ValidatorEngine> = if execute {
            Arc::new(ReportReaderEngine)
        } else {
            Arc::new(DryRunEngine)
        };
        Self { ws, engine }
    }

    pub fn with_engine(ws: &'w Workspace, engine: Arc<dyn ValidatorEngine>) -> Self {
        Self { ws, engine }
    }

    /// Task ids for the requested scope (the task alone, or the hierarchy
    /// rooted at it).
    pub fn scope_task_ids(&self, root_id: &str, hierarchy: bool) -> Result<Vec<String>, EngineError> {
        let mut out = vec![root_id.to_string()];
        if !hierarchy {
            return Ok(out);
        }
        let mut queue = vec![root_id.to_string()];
        let mut seen: BTreeSet<String> = out.iter().cloned().collect();
        while let Some(id) = queue.pop() {
            let Some(task) = self.ws.tasks().get(&id)? else {
                continue;
            };
            for child in &task.child_ids {
                if seen.insert(child.to_string()) {
                    out.push(child.to_string());
                    queue.push(child.to_string());
                }
            }
        }
        Ok(out)
    }

    /// Run validation for every task in scope, in order.
    pub async fn run(
        &self,
        root_id: &str,
        opts: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidationRun>, EngineError> {
        let mut runs = Vec::new();
        for task_id in self.scope_task_ids(root_id, opts.hierarchy)? {
            runs.push(self.run_task(&task_id, opts, cancel).await?);
        }
        Ok(runs)
    }

    /// Run validation for a single task.
    pub async fn run_task(
        &self,
        task_id: &str,
        opts: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<ValidationRun, EngineError> {
        let task = self
            .ws
            .tasks()
            .get(task_id)?
            .ok_or_else(|| EngineError::Store(edison_store::StoreError::NotFound {
                id: task_id.to_string(),
            }))?;

        let validation = self.ws.validation_config();
        let preset_name = match &opts.preset {
            Some(p) => p.clone(),
            None => validation.default_preset()?,
        };
        let mut expected =
            self.ws
                .expected_validator_set(&task, &preset_name, &opts.changed_files)?;
        let validators = validation.validators()?;
        for id in &opts.add_validators {
            if expected.iter().any(|v| &v.id == id) {
                continue;
            }
            if let Some(spec) = validators.get(id) {
                expected.push(ExpectedValidator {
                    id: id.clone(),
                    blocking: spec.blocking,
                    wave: spec.wave.clone(),
                });
            }
        }

        let round = match self.ws.evidence().current_round(task_id) {
            0 => {
                let (n, _) = self.ws.evidence().start_next_round(task_id)?;
                n
            }
            n => n,
        };

        let sequential = opts.sequential.unwrap_or_else(|| validation.sequential());
        let max_workers = opts.max_workers.unwrap_or_else(|| validation.max_workers());

        let mut waves_out: Vec<WaveOutcome> = Vec::new();
        let mut stopped_after = None;
        let mut prev_passed = true;
        let mut collected: Vec<ValidatorReport> = Vec::new();

        for wave in validation.waves()? {
            let members: Vec<&ExpectedValidator> =
                expected.iter().filter(|v| v.wave == wave.name).collect();
            if members.is_empty() {
                continue;
            }
            if wave.requires_previous_pass && !prev_passed {
                stopped_after = waves_out.last().map(|w: &WaveOutcome| w.name.clone());
                break;
            }

            let requests: Vec<DispatchRequest> = members
                .iter()
                .filter_map(|v| {
                    validators.get(&v.id).map(|spec| DispatchRequest {
                        task_id: task_id.to_string(),
                        round,
                        validator_id: v.id.clone(),
                        spec: spec.clone(),
                        files: self.ws.file_context(&task, &opts.changed_files),
                    })
                })
                .collect();

            let reports = self
                .dispatch_wave(requests, sequential, max_workers, cancel)
                .await?;

            // Wave pass evaluation is deferred until all dispatches complete.
            let passed = members
                .iter()
                .filter(|v| v.blocking)
                .all(|v| reports.iter().any(|r| r.validator_id == v.id && r.is_passed()));
            collected.extend(reports.iter().cloned());
            let continue_on_fail = wave.continue_on_fail;
            let name = wave.name.clone();
            waves_out.push(WaveOutcome {
                name: name.clone(),
                reports,
                passed,
            });
            prev_passed = passed;
            if !passed && !continue_on_fail {
                stopped_after = Some(name);
                break;
            }
        }

        let bundle = if opts.execute {
            let mut passed_ids = Vec::new();
            let mut failed_ids = Vec::new();
            for v in &expected {
                let ok = collected
                    .iter()
                    .any(|r| r.validator_id == v.id && r.is_passed());
                if ok {
                    passed_ids.push(v.id.clone());
                } else {
                    failed_ids.push(v.id.clone());
                }
            }
            let approved = expected
                .iter()
                .filter(|v| v.blocking)
                .all(|v| passed_ids.contains(&v.id));
            let bundle = BundleSummary {
                approved,
                round,
                preset: preset_name.clone(),
                passed: passed_ids,
                failed: failed_ids,
                timestamp: self.ws.now(),
                extras: serde_json::Map::new(),
            };
            self.ws.evidence().write_bundle(task_id, &bundle)?;
            Some(bundle)
        } else {
            None
        };

        Ok(ValidationRun {
            task_id: task_id.to_string(),
            round,
            preset: preset_name,
            expected,
            waves: waves_out,
            stopped_after,
            bundle,
        })
    }

    /// Dispatch one wave through the bounded worker pool.
    async fn dispatch_wave(
        &self,
        requests: Vec<DispatchRequest>,
        sequential: bool,
        max_workers: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ValidatorReport>, EngineError> {
        if sequential || max_workers <= 1 {
            let mut out = Vec::new();
            for request in requests {
                out.push(self.dispatch_one(&request, cancel).await?);
            }
            return Ok(out);
        }

        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let mut join_set = tokio::task::JoinSet::new();
        for request in requests {
            let semaphore = Arc::clone(&semaphore);
            let engine = Arc::clone(&self.engine);
            let evidence = self.ws.evidence().clone();
            let cancel = cancel.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                dispatch_inner(engine.as_ref(), &evidence, &request, &cancel).await
            });
        }
        let mut out = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let report = joined.map_err(|e| EngineError::Dispatch {
                validator: "<pool>".to_string(),
                message: e.to_string(),
            })??;
            out.push(report);
        }
        out.sort_by(|a, b| a.validator_id.cmp(&b.validator_id));
        Ok(out)
    }

    async fn dispatch_one(
        &self,
        request: &DispatchRequest,
        cancel: &CancellationToken,
    ) -> Result<ValidatorReport, EngineError> {
        dispatch_inner(self.engine.as_ref(), self.ws.evidence(), request, cancel).await
    }
}

/// One dispatch: web-server guard, cancellation check, engine run.
async fn dispatch_inner(
    engine: &dyn ValidatorEngine,
    evidence: &EvidenceService,
    request: &DispatchRequest,
    cancel: &CancellationToken,
) -> Result<ValidatorReport, EngineError> {
    if cancel.is_cancelled() {
        return Ok(cancelled_report(request));
    }
    let guard = match &request.spec.web_server {
        Some(spec) => web_server::ensure(spec, &request.validator_id).await?,
        None => web_server::WebServerGuard::None,
    };
    let result = tokio::select! {
        _ = cancel.cancelled() => Ok(cancelled_report(request)),
        r = engine.run(request, evidence) => r,
    };
    guard.teardown().await;
    result
}

/// Cancellation yields a blocked verdict; no partial report files.
fn cancelled_report(request: &DispatchRequest) -> ValidatorReport {
    ValidatorReport {
        task_id: request.task_id.clone(),
        round: request.round,
        validator_id: request.validator_id.clone(),
        model: request.spec.engine.clone(),
        verdict: Verdict::Blocked,
        tracking: Tracking::default(),
        strengths: Vec::new(),
        findings: Vec::new(),
        summary: Some("cancelled".to_string()),
        follow_up_tasks: Vec::new(),
        extras: serde_json::Map::new(),
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
