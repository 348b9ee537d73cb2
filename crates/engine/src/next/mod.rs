// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session next planner: deterministic next-best-action computation.
//!
//! Reads the session's tasks and QA records plus the global inbox, then
//! emits claim/capture/promote/validate actions with guard previews,
//! structured blockers, missing-report visibility, and deduplicated
//! follow-up suggestions. `cmd` arrays are current-token CLI invocations.

use crate::error::EngineError;
use crate::workspace::Workspace;
use edison_core::{
    BlockedByDependency, ReadinessEvaluator, SessionId, SimilarityDoc, SimilarityIndex, Task,
    TaskPlanner,
};
use edison_state::WorkflowEnv;
use serde::Serialize;

/// Preview of the guard evaluation a promote action would hit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardPreview {
    pub from: String,
    pub to: String,
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// One recommended action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAction {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa_id: Option<String>,
    pub cmd: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard_preview: Option<GuardPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Wave number for claim actions (parallelisable batches).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave: Option<usize>,
}

/// One dependency-blocked task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextBlocker {
    pub task_id: String,
    pub blocked_by: Vec<BlockedByDependency>,
}

/// One missing expected artifact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingReport {
    pub task_id: String,
    pub kind: String,
    pub filename: String,
}

/// One follow-up suggestion derived from implementation reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpSuggestion {
    pub title: String,
    pub source_task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub cmd: Vec<String>,
}

/// The deterministic planner output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPlan {
    pub session_id: String,
    pub actions: Vec<NextAction>,
    pub blockers: Vec<NextBlocker>,
    pub reports_missing: Vec<MissingReport>,
    pub follow_ups_plan: Vec<FollowUpSuggestion>,
    pub recommendations: Vec<String>,
}

/// Compute the next plan for a session.
pub fn compute_next(ws: &Workspace, session_id: &str) -> Result<NextPlan, EngineError> {
    let session = ws
        .sessions()
        .get(session_id)?
        .ok_or_else(|| EngineError::SessionNotFound {
            id: session_id.to_string(),
        })?;
    let sid = SessionId::new(session_id);

    let workflow = ws.workflow();
    let todo = workflow.semantic_state("task", "todo")?;
    let wip = workflow.semantic_state("task", "wip")?;
    let done = workflow.semantic_state("task", "done")?;
    let qa_todo = workflow.semantic_state("qa", "todo")?;
    let qa_wip = workflow.semantic_state("qa", "wip")?;

    let graph = ws.task_graph()?;
    let policy = ws.readiness_policy()?;
    let scoped = graph.scoped(Some(&sid));
    let machine = ws.machine()?;

    let mut actions = Vec::new();
    let mut blockers = Vec::new();
    let mut reports_missing = Vec::new();
    let mut recommendations = Vec::new();

    // Session tasks plus the global inbox, id order.
    let mut tasks: Vec<Task> = Vec::new();
    for summary in scoped.tasks.values() {
        if let Some(task) = ws.tasks().get(summary.id.as_str())? {
            tasks.push(task);
        }
    }

    for task in &tasks {
        let task_id = task.id.to_string();
        if task.state == wip {
            let evidence_blockers = WorkflowEnv::evidence_blockers(ws, &task_id);
            if evidence_blockers.is_empty() {
                let violations = machine.preview_task(&task_id, &done)?;
                let status = if violations.is_empty() { "ready" } else { "blocked" };
                actions.push(NextAction {
                    action: "task.promote.done".to_string(),
                    task_id: Some(task_id.clone()),
                    qa_id: None,
                    cmd: vec![
                        "edison".to_string(),
                        "task".to_string(),
                        "ready".to_string(),
                        task_id.clone(),
                    ],
                    guard_preview: Some(GuardPreview {
                        from: task.state.clone(),
                        to: done.clone(),
                        status: status.to_string(),
                        missing: violations.iter().map(|v| v.guard.clone()).collect(),
                    }),
                    note: None,
                    wave: None,
                });
            } else {
                for b in &evidence_blockers {
                    reports_missing.push(MissingReport {
                        task_id: task_id.clone(),
                        kind: b.kind.clone(),
                        filename: b.filename.clone(),
                    });
                }
                actions.push(NextAction {
                    action: "evidence.capture".to_string(),
                    task_id: Some(task_id.clone()),
                    qa_id: None,
                    cmd: vec![
                        "edison".to_string(),
                        "evidence".to_string(),
                        "capture".to_string(),
                        task_id.clone(),
                    ],
                    guard_preview: None,
                    note: Some(format!(
                        "{} evidence artifact(s) missing or failing",
                        evidence_blockers.len()
                    )),
                    wave: None,
                });
            }
        } else if task.state == done {
            let round = WorkflowEnv::current_round(ws, &task_id);
            let approved = WorkflowEnv::read_bundle(ws, &task_id, round)
                .map(|b| b.approved)
                .unwrap_or(false);
            if !approved {
                let qa_id = task.id.qa_id();
                if let Some(qa) = ws.qa().get(qa_id.as_str())? {
                    if qa.state == qa_todo {
                        actions.push(NextAction {
                            action: "qa.promote.wip".to_string(),
                            task_id: Some(task_id.clone()),
                            qa_id: Some(qa_id.to_string()),
                            cmd: vec![
                                "edison".to_string(),
                                "qa".to_string(),
                                "promote".to_string(),
                                task_id.clone(),
                                "--to".to_string(),
                                qa_wip.clone(),
                            ],
                            guard_preview: None,
                            note: None,
                            wave: None,
                        });
                    }
                }
                actions.push(NextAction {
                    action: "qa.run-validators".to_string(),
                    task_id: Some(task_id.clone()),
                    qa_id: Some(qa_id.to_string()),
                    cmd: vec![
                        "edison".to_string(),
                        "qa".to_string(),
                        "validate".to_string(),
                        task_id.clone(),
                        "--execute".to_string(),
                    ],
                    guard_preview: None,
                    note: None,
                    wave: None,
                });
                missing_validator_reports(ws, &task_id, round, &mut reports_missing);
            } else {
                actions.push(NextAction {
                    action: "task.promote.validated".to_string(),
                    task_id: Some(task_id.clone()),
                    qa_id: None,
                    cmd: vec![
                        "edison".to_string(),
                        "qa".to_string(),
                        "promote".to_string(),
                        task_id.clone(),
                    ],
                    guard_preview: None,
                    note: None,
                    wave: None,
                });
            }
        }
    }

    // QA records in active states also surface missing context7 markers.
    for qa in ws.qa().find_by_session(session_id)? {
        if qa.state == qa_todo || qa.state == qa_wip {
            missing_context7_markers(ws, qa.task_id.as_str(), &mut reports_missing)?;
        }
    }

    // Claimable todo tasks, wave-ordered.
    let planner = TaskPlanner::new(&scoped, &policy);
    let plan = planner.build_plan();
    for wave in &plan.waves {
        for summary in &wave.tasks {
            let mut cmd = vec![
                "edison".to_string(),
                "task".to_string(),
                "claim".to_string(),
                summary.id.to_string(),
            ];
            if summary.session_id.is_some() {
                cmd.push("--session-id".to_string());
                cmd.push(session_id.to_string());
            }
            actions.push(NextAction {
                action: "task.claim".to_string(),
                task_id: Some(summary.id.to_string()),
                qa_id: None,
                cmd,
                guard_preview: None,
                note: None,
                wave: Some(wave.wave),
            });
        }
    }

    // Structured blockers from readiness diagnostics.
    let evaluator = ReadinessEvaluator::new(&graph, &policy);
    for readiness in evaluator.blocked_tasks(Some(&sid)) {
        blockers.push(NextBlocker {
            task_id: readiness.task.id.to_string(),
            blocked_by: readiness.blocked_by,
        });
    }
    // Global-inbox blockers visible from this session's scope.
    for blocked in &plan.blocked {
        if blockers.iter().any(|b| b.task_id == blocked.task.id.as_str()) {
            continue;
        }
        blockers.push(NextBlocker {
            task_id: blocked.task.id.to_string(),
            blocked_by: blocked.blocked_by.clone(),
        });
    }

    let follow_ups_plan = follow_up_suggestions(ws, &tasks, session_id)?;

    if actions.is_empty() && blockers.is_empty() {
        recommendations.push(format!(
            "No pending work in session {session_id}; consider `edison session complete`"
        ));
    }
    if !plan.waves.is_empty() {
        let first = &plan.waves[0];
        if first.tasks.len() > 1 {
            recommendations.push(format!(
                "Wave 1 has {} independent tasks; they can be claimed in parallel",
                first.tasks.len()
            ));
        }
    }
    if tasks.iter().any(|t| t.state == todo) && session.git.worktree_path.is_none() {
        let worktree_enabled = ws.session_config().worktree_enabled();
        if worktree_enabled {
            recommendations.push(
                "Session has no worktree; run `edison session worktree-restore` before claiming"
                    .to_string(),
            );
        }
    }

    Ok(NextPlan {
        session_id: session_id.to_string(),
        actions,
        blockers,
        reports_missing,
        follow_ups_plan,
        recommendations,
    })
}

/// Expected validator reports not yet on disk for the round.
fn missing_validator_reports(
    ws: &Workspace,
    task_id: &str,
    round: u32,
    out: &mut Vec<MissingReport>,
) {
    if round == 0 {
        return;
    }
    let present: Vec<String> = WorkflowEnv::validator_reports(ws, task_id, round)
        .into_iter()
        .map(|r| r.validator_id)
        .collect();
    for expected in WorkflowEnv::expected_validators(ws, task_id) {
        if !present.contains(&expected.id) {
            out.push(MissingReport {
                task_id: task_id.to_string(),
                kind: "validator-report".to_string(),
                filename: edison_store::ValidatorReport::file_name(&expected.id),
            });
        }
    }
}

/// Context7 markers required for triggered packages but absent.
fn missing_context7_markers(
    ws: &Workspace,
    task_id: &str,
    out: &mut Vec<MissingReport>,
) -> Result<(), EngineError> {
    let ctx7 = edison_config::Context7Config::new(ws.registry().merged());
    if !ctx7.enabled() {
        return Ok(());
    }
    let Some(task) = ws.tasks().get(task_id)? else {
        return Ok(());
    };
    let files = ws.file_context(&task, &[]);
    let round = WorkflowEnv::current_round(ws, task_id);
    let present = ws.evidence().list_context7_packages(task_id, round);
    for (package, _) in ctx7.triggered_packages(&files) {
        if !present.contains(&package) {
            out.push(MissingReport {
                task_id: task_id.to_string(),
                kind: "context7".to_string(),
                filename: edison_store::Context7Marker::file_name(&package),
            });
        }
    }
    Ok(())
}

/// Follow-up tasks from implementation reports, deduplicated against the
/// existing task population via the similarity index.
fn follow_up_suggestions(
    ws: &Workspace,
    session_tasks: &[Task],
    session_id: &str,
) -> Result<Vec<FollowUpSuggestion>, EngineError> {
    let all_tasks = ws.tasks().find_all()?;
    let index = SimilarityIndex::new(
        all_tasks.iter().map(|t| SimilarityDoc {
            task_id: t.id.clone(),
            title: t.title.clone(),
            body: t.description.clone(),
            state: t.state.clone(),
            session_id: t.session_id.clone(),
        }),
        ws.task_config().similarity_weights(),
    );

    let mut out = Vec::new();
    for task in session_tasks {
        let round = WorkflowEnv::current_round(ws, task.id.as_str());
        if round == 0 {
            continue;
        }
        let Ok(report) = ws.evidence().read_implementation_report(task.id.as_str(), round) else {
            continue;
        };
        for follow_up in &report.follow_up_tasks {
            let matches = index.find_similar(&follow_up.title, &follow_up.description);
            let duplicate = matches.first();
            let slug = slugify(&follow_up.title);
            out.push(FollowUpSuggestion {
                title: follow_up.title.clone(),
                source_task: task.id.to_string(),
                duplicate_of: duplicate.map(|m| m.task_id.to_string()),
                score: duplicate.map(|m| (m.score * 100.0).round() / 100.0),
                cmd: vec![
                    "edison".to_string(),
                    "task".to_string(),
                    "create".to_string(),
                    slug,
                    "--title".to_string(),
                    follow_up.title.clone(),
                    "--session-id".to_string(),
                    session_id.to_string(),
                ],
            });
        }
    }
    Ok(out)
}

fn slugify(title: &str) -> String {
    let mut out = String::new();
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
#[path = "next_tests.rs"]
mod tests;
