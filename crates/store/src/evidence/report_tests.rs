// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn report(verdict: Verdict, completed: bool) -> ValidatorReport {
    ValidatorReport {
        task_id: "t-001".to_string(),
        round: 1,
        validator_id: "global-codex".to_string(),
        model: "gpt-5".to_string(),
        verdict,
        tracking: Tracking {
            process_id: Some(1234),
            started_at: Some("2026-01-01T00:00:00Z".to_string()),
            completed_at: completed.then(|| "2026-01-01T00:05:00Z".to_string()),
        },
        strengths: Vec::new(),
        findings: Vec::new(),
        summary: None,
        follow_up_tasks: Vec::new(),
        extras: serde_json::Map::new(),
    }
}

#[test]
fn approve_with_completion_passes() {
    assert!(report(Verdict::Approve, true).is_passed());
    assert!(report(Verdict::Pass, true).is_passed());
}

#[test]
fn missing_completed_at_never_passes() {
    assert!(!report(Verdict::Approve, false).is_passed());
}

#[test]
fn reject_and_blocked_never_pass() {
    assert!(!report(Verdict::Reject, true).is_passed());
    assert!(!report(Verdict::Blocked, true).is_passed());
}

#[test]
fn verdict_serializes_lowercase() {
    let json = serde_json::to_string(&Verdict::Approve).unwrap();
    assert_eq!(json, "\"approve\"");
    let back: Verdict = serde_json::from_str("\"blocked\"").unwrap();
    assert_eq!(back, Verdict::Blocked);
}

#[test]
fn report_round_trip_preserves_unknown_fields() {
    let json = serde_json::json!({
        "taskId": "t-001",
        "round": 2,
        "validatorId": "security",
        "verdict": "reject",
        "tracking": {"completedAt": "2026-01-01T00:00:00Z"},
        "findings": [{"description": "SQL injection", "severity": "high"}],
        "engineInternal": {"tokens": 9000},
    });
    let report: ValidatorReport = serde_json::from_value(json).unwrap();
    assert_eq!(report.findings.len(), 1);
    assert!(report.extras.contains_key("engineInternal"));
    let out = serde_json::to_value(&report).unwrap();
    assert_eq!(out["engineInternal"]["tokens"], serde_json::json!(9000));
}

#[test]
fn implementation_report_defaults() {
    let report: ImplementationReport = serde_json::from_str("{}").unwrap();
    assert!(report.follow_up_tasks.is_empty());
    assert!(report.blockers.is_empty());
    assert_eq!(ValidatorReport::file_name("x"), "validator-x-report.json");
    assert_eq!(ImplementationReport::FILE_NAME, "implementation-report.json");
}
