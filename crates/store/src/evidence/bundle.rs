// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregated round verdict (`bundle-approved.json`).

use serde::{Deserialize, Serialize};

/// The gate for task `validated`: written once per round by the
/// orchestrator's aggregation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleSummary {
    pub approved: bool,
    pub round: u32,
    pub preset: String,
    #[serde(default)]
    pub passed: Vec<String>,
    #[serde(default)]
    pub failed: Vec<String>,
    /// RFC 3339 timestamp of the aggregation.
    pub timestamp: String,
    /// Unknown fields, preserved through round-trips.
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl BundleSummary {
    pub const FILE_NAME: &'static str = "bundle-approved.json";
}
