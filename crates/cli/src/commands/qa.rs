// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison qa …`

use super::{engine_error, evidence_error, state_error, Ctx};
use crate::exit_error::ExitError;
use crate::output::{md_section, render, OutputFormat};
use clap::Subcommand;
use edison_engine::{RunOptions, SessionManager, ValidationOrchestrator};
use tokio_util::sync::CancellationToken;

#[derive(Subcommand)]
pub enum QaCmd {
    /// Run validator sequencing for a task (dry run unless --execute)
    Validate {
        task_id: String,
        #[arg(long)]
        preset: Option<String>,
        /// Execute: consume reports, write the bundle, promote on approval
        #[arg(long)]
        execute: bool,
        /// Removed; use --execute
        #[arg(long, hide = true)]
        run: bool,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        sequential: bool,
        #[arg(long)]
        max_workers: Option<usize>,
        /// Extra validator ids appended to the expected set
        #[arg(long)]
        add_validators: Vec<String>,
        /// `task` (default) or `hierarchy`
        #[arg(long, default_value = "task")]
        scope: String,
    },
    /// Aggregate the current round's reports into bundle-approved.json
    Bundle {
        task_id: String,
        #[arg(long)]
        preset: Option<String>,
    },
    /// Promote a validated task: QA done, task validated, QA validated.
    /// With --to, only move the QA record to that semantic state.
    Promote {
        task_id: String,
        #[arg(long)]
        to: Option<String>,
    },
    /// Start the next evidence round for a task
    Round {
        task_id: String,
    },
}

pub async fn run(cmd: QaCmd, ctx: &Ctx) -> Result<(), ExitError> {
    match cmd {
        QaCmd::Validate {
            task_id,
            preset,
            execute,
            run,
            dry_run,
            sequential,
            max_workers,
            add_validators,
            scope,
        } => {
            if run {
                return Err(ExitError::new(
                    1,
                    "--run was removed; use --execute to run validators and consume reports",
                )
                .with_code("deprecated_flag"));
            }
            validate(
                ctx,
                &task_id,
                preset,
                execute && !dry_run,
                sequential,
                max_workers,
                add_validators,
                &scope,
            )
            .await
        }
        QaCmd::Bundle { task_id, preset } => bundle(ctx, &task_id, preset).await,
        QaCmd::Promote { task_id, to } => match to {
            Some(to) => promote_qa_to(ctx, &task_id, &to),
            None => promote(ctx, &task_id),
        },
        QaCmd::Round { task_id } => {
            let (round, dir) = ctx
                .ws
                .evidence()
                .start_next_round(&task_id)
                .map_err(evidence_error)?;
            println!("Round {round} opened at {}", dir.display());
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn validate(
    ctx: &Ctx,
    task_id: &str,
    preset: Option<String>,
    execute: bool,
    sequential: bool,
    max_workers: Option<usize>,
    add_validators: Vec<String>,
    scope: &str,
) -> Result<(), ExitError> {
    let changed_files = changed_files_for_task(ctx, task_id).await;
    let opts = RunOptions {
        preset,
        execute,
        sequential: sequential.then_some(true),
        max_workers,
        add_validators,
        hierarchy: scope == "hierarchy",
        changed_files,
    };
    let orchestrator = ValidationOrchestrator::new(&ctx.ws, execute);
    let runs = orchestrator
        .run(task_id, &opts, &CancellationToken::new())
        .await
        .map_err(engine_error)?;

    // On approval, drive the QA/task promotion chain.
    if execute {
        for run in &runs {
            if run.approved() {
                promote(ctx, &run.task_id)?;
            }
        }
    }

    let payload: Vec<serde_json::Value> = runs
        .iter()
        .map(|run| {
            serde_json::json!({
                "taskId": run.task_id,
                "round": run.round,
                "preset": run.preset,
                "approved": run.approved(),
                "stoppedAfter": run.stopped_after,
                "waves": run.waves.iter().map(|w| {
                    serde_json::json!({
                        "name": w.name,
                        "passed": w.passed,
                        "validators": w.reports.iter().map(|r| {
                            serde_json::json!({"id": r.validator_id, "verdict": r.verdict})
                        }).collect::<Vec<_>>(),
                    })
                }).collect::<Vec<_>>(),
            })
        })
        .collect();

    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &payload, || {
            let mut md = String::new();
            for run in &runs {
                md.push_str(&format!(
                    "# Validation: {} (round {}, preset {})\n\n",
                    run.task_id, run.round, run.preset
                ));
                for wave in &run.waves {
                    let mark = if wave.passed { "passed" } else { "failed" };
                    md.push_str(&format!("- Wave {}: {}\n", wave.name, mark));
                    for report in &wave.reports {
                        md.push_str(&format!(
                            "  - {}: {:?}\n",
                            report.validator_id, report.verdict
                        ));
                    }
                }
                if let Some(stopped) = &run.stopped_after {
                    md.push_str(&format!("\nSequencing stopped after wave {stopped}.\n"));
                }
                match &run.bundle {
                    Some(b) if b.approved => md.push_str("\nBundle approved.\n"),
                    Some(_) => md.push_str("\nBundle NOT approved.\n"),
                    None => md.push_str("\nDry run: no bundle written.\n"),
                }
                md.push('\n');
            }
            md
        })
    );

    // Evidence/validation failure is a generic failure for scripting.
    if execute && runs.iter().any(|r| !r.approved()) {
        return Err(ExitError::new(1, "validation not approved").with_code("bundle_not_approved"));
    }
    Ok(())
}

async fn bundle(ctx: &Ctx, task_id: &str, preset: Option<String>) -> Result<(), ExitError> {
    let changed_files = changed_files_for_task(ctx, task_id).await;
    let opts = RunOptions {
        preset,
        execute: true,
        changed_files,
        ..Default::default()
    };
    let orchestrator = ValidationOrchestrator::new(&ctx.ws, true);
    let run = orchestrator
        .run_task(task_id, &opts, &CancellationToken::new())
        .await
        .map_err(engine_error)?;
    let bundle = run
        .bundle
        .clone()
        .ok_or_else(|| ExitError::new(1, "no bundle produced"))?;

    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &bundle, || {
            let mut md = format!(
                "# Bundle for {task_id} (round {})\n\n- Approved: {}\n",
                bundle.round, bundle.approved
            );
            md.push_str(&md_section("Passed", &bundle.passed));
            md.push_str(&md_section("Failed", &bundle.failed));
            md
        })
    );
    Ok(())
}

/// Move the QA record to one semantic state (`--to wip` etc.).
fn promote_qa_to(ctx: &Ctx, task_id: &str, semantic: &str) -> Result<(), ExitError> {
    let machine = ctx.ws.machine().map_err(engine_error)?;
    let target = ctx
        .ws
        .workflow()
        .semantic_state("qa", semantic)
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    let qa_id = format!("{task_id}-qa");
    let qa = machine
        .transition_qa(&qa_id, &target, None)
        .map_err(state_error)?;
    println!("QA record {qa_id} is now `{}`.", qa.state);
    Ok(())
}

/// QA wip/todo → done, task done → validated, QA done → validated.
fn promote(ctx: &Ctx, task_id: &str) -> Result<(), ExitError> {
    let machine = ctx.ws.machine().map_err(engine_error)?;
    let workflow = ctx.ws.workflow();
    let qa_id = format!("{task_id}-qa");
    let qa_wip = workflow
        .semantic_state("qa", "wip")
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    let qa_done = workflow
        .semantic_state("qa", "done")
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    let qa_todo = workflow
        .semantic_state("qa", "todo")
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    let qa_validated = workflow
        .semantic_state("qa", "validated")
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    let task_validated = workflow
        .semantic_state("task", "validated")
        .map_err(|e| ExitError::new(1, e.to_string()))?;

    let qa = ctx
        .ws
        .qa()
        .get(&qa_id)
        .map_err(super::store_error)?
        .ok_or_else(|| ExitError::new(1, format!("QA record {qa_id} not found")))?;

    if qa.state == qa_todo {
        machine
            .transition_qa(&qa_id, &qa_wip, Some("validators running"))
            .map_err(state_error)?;
    }
    let qa = ctx
        .ws
        .qa()
        .get(&qa_id)
        .map_err(super::store_error)?
        .ok_or_else(|| ExitError::new(1, format!("QA record {qa_id} not found")))?;
    if qa.state == qa_wip {
        machine
            .transition_qa(&qa_id, &qa_done, Some("blocking validators passed"))
            .map_err(state_error)?;
    }
    machine
        .transition_task(task_id, &task_validated, Some("bundle approved"))
        .map_err(state_error)?;
    machine
        .transition_qa(&qa_id, &qa_validated, Some("task validated"))
        .map_err(state_error)?;

    println!("Task {task_id} validated; QA record {qa_id} validated.");
    Ok(())
}

/// Worktree diff for the task's owning session, when one exists.
async fn changed_files_for_task(ctx: &Ctx, task_id: &str) -> Vec<String> {
    let Ok(Some(task)) = ctx.ws.tasks().get(task_id) else {
        return Vec::new();
    };
    let Some(session_id) = &task.session_id else {
        return Vec::new();
    };
    let Ok(Some(session)) = ctx.ws.sessions().get(session_id.as_str()) else {
        return Vec::new();
    };
    let manager = SessionManager::new(&ctx.ws);
    manager.changed_files(&session).await.unwrap_or_default()
}
