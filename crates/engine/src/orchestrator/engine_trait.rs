// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validator dispatch engines.
//!
//! Validator bodies are external (agent calls or subprocesses); the
//! orchestrator only owns dispatch, sequencing, and aggregation. Engines
//! implement this seam.

use crate::error::EngineError;
use async_trait::async_trait;
use edison_config::ValidatorSpec;
use edison_store::{EvidenceService, Tracking, ValidatorReport, Verdict};

/// One validator invocation request.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub task_id: String,
    pub round: u32,
    pub validator_id: String,
    pub spec: ValidatorSpec,
    /// File context for the validator prompt (primary + changed files).
    pub files: Vec<String>,
}

/// Engine seam: produce a report for one validator.
#[async_trait]
pub trait ValidatorEngine: Send + Sync {
    async fn run(
        &self,
        request: &DispatchRequest,
        evidence: &EvidenceService,
    ) -> Result<ValidatorReport, EngineError>;
}

/// Dry-run engine: records the planned invocation as
/// `delegation-{id}.md` plus a placeholder report that never passes.
pub struct DryRunEngine;

#[async_trait]
impl ValidatorEngine for DryRunEngine {
    async fn run(
        &self,
        request: &DispatchRequest,
        evidence: &EvidenceService,
    ) -> Result<ValidatorReport, EngineError> {
        let files = if request.files.is_empty() {
            "- (none)".to_string()
        } else {
            request
                .files
                .iter()
                .map(|f| format!("- {f}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let content = format!(
            "# Delegation: {id}\n\nTask: {task}\nRound: {round}\nEngine: {engine}\nWave: {wave}\n\n## Files\n{files}\n",
            id = request.validator_id,
            task = request.task_id,
            round = request.round,
            engine = request.spec.engine,
            wave = request.spec.wave,
        );
        evidence.write_delegation(&request.task_id, request.round, &request.validator_id, &content)?;
        Ok(placeholder(request))
    }
}

/// Execute-mode engine for externally produced reports: reads the report a
/// validator agent wrote into the round directory. Absent or malformed
/// reports degrade to a blocked placeholder (fail-closed).
pub struct ReportReaderEngine;

#[async_trait]
impl ValidatorEngine for ReportReaderEngine {
    async fn run(
        &self,
        request: &DispatchRequest,
        evidence: &EvidenceService,
    ) -> Result<ValidatorReport, EngineError> {
        match evidence.read_validator_report(&request.task_id, request.round, &request.validator_id)
        {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::debug!(
                    validator = %request.validator_id,
                    error = %e,
                    "no usable report; treating as blocked"
                );
                Ok(placeholder(request))
            }
        }
    }
}

/// A blocked, incomplete report: counts as "not passed" everywhere.
fn placeholder(request: &DispatchRequest) -> ValidatorReport {
    ValidatorReport {
        task_id: request.task_id.clone(),
        round: request.round,
        validator_id: request.validator_id.clone(),
        model: request.spec.engine.clone(),
        verdict: Verdict::Blocked,
        tracking: Tracking::default(),
        strengths: Vec::new(),
        findings: Vec::new(),
        summary: None,
        follow_up_tasks: Vec::new(),
        extras: serde_json::Map::new(),
    }
}
