// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validator and implementation reports (JSON artifacts).

use serde::{Deserialize, Serialize};

/// Validator verdict. `Pass` is accepted as an approval synonym from older
/// validator engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Pass,
    Reject,
    Blocked,
}

impl Verdict {
    pub fn is_approving(self) -> bool {
        matches!(self, Verdict::Approve | Verdict::Pass)
    }
}

/// Dispatch bookkeeping on a validator report.
///
/// `completed_at` is required for a report to count: a report without it is
/// treated as not complete by every aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    #[serde(default)]
    pub process_id: Option<u32>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// One finding inside a validator report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// Per-validator result for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorReport {
    pub task_id: String,
    pub round: u32,
    pub validator_id: String,
    #[serde(default)]
    pub model: String,
    pub verdict: Verdict,
    #[serde(default)]
    pub tracking: Tracking,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up_tasks: Vec<String>,
    /// Unknown fields, preserved through round-trips.
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl ValidatorReport {
    pub fn file_name(validator_id: &str) -> String {
        format!("validator-{validator_id}-report.json")
    }

    /// Fail-closed pass check: approving verdict AND a completion stamp.
    pub fn is_passed(&self) -> bool {
        self.verdict.is_approving() && self.tracking.completed_at.is_some()
    }
}

/// Implementer-produced report for one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationReport {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub round: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up_tasks: Vec<FollowUpTask>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_for_validator: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_changed: Vec<String>,
    #[serde(default)]
    pub primary_model: String,
    /// Unknown fields, preserved through round-trips.
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

/// Follow-up suggestion emitted by the implementer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ImplementationReport {
    pub const FILE_NAME: &'static str = "implementation-report.json";
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
