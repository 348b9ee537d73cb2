// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison task …`

use super::{engine_error, state_error, store_error, Ctx};
use crate::exit_error::ExitError;
use crate::output::{md_section, render, OutputFormat};
use clap::Subcommand;
use edison_core::{
    QaRecord, ReadinessEvaluator, SessionId, SimilarityDoc, SimilarityIndex, Task, TaskId,
};
use edison_state::WorkflowEnv;

#[derive(Subcommand)]
pub enum TaskCmd {
    /// Create a task (and by default its waiting QA shadow)
    Create {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, short = 'd')]
        description: Option<String>,
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        depends_on: Vec<String>,
        #[arg(long)]
        tags: Vec<String>,
        /// Skip creation of the QA shadow record
        #[arg(long)]
        no_qa: bool,
    },
    /// Claim a todo task: transition to wip and attach session + owner
    Claim {
        id: String,
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Mark a wip task done after the evidence gate passes
    Ready {
        id: String,
        /// Bypass the context7 documentation gate (writes an audit trail)
        #[arg(long)]
        skip_context7: bool,
    },
    /// Show a task with readiness diagnostics
    Status { id: String },
    /// List dependency-blocked tasks
    Blocked {
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Find tasks similar to a candidate title/description
    Similar {
        #[arg(long)]
        title: String,
        #[arg(long, short = 'd', default_value = "")]
        description: String,
    },
}

pub async fn run(cmd: TaskCmd, ctx: &Ctx) -> Result<(), ExitError> {
    match cmd {
        TaskCmd::Create {
            id,
            title,
            description,
            session_id,
            owner,
            depends_on,
            tags,
            no_qa,
        } => create(
            ctx,
            &id,
            &title,
            description.as_deref(),
            session_id.as_deref(),
            owner.as_deref(),
            depends_on,
            tags,
            !no_qa,
        ),
        TaskCmd::Claim {
            id,
            session_id,
            owner,
        } => claim(ctx, &id, session_id.as_deref(), owner.as_deref()),
        TaskCmd::Ready { id, skip_context7 } => ready(ctx, &id, skip_context7),
        TaskCmd::Status { id } => status(ctx, &id),
        TaskCmd::Blocked { session_id } => blocked(ctx, session_id.as_deref()),
        TaskCmd::Similar { title, description } => similar(ctx, &title, &description),
    }
}

#[allow(clippy::too_many_arguments)]
fn create(
    ctx: &Ctx,
    id: &str,
    title: &str,
    description: Option<&str>,
    session_id: Option<&str>,
    owner: Option<&str>,
    depends_on: Vec<String>,
    tags: Vec<String>,
    create_qa: bool,
) -> Result<(), ExitError> {
    let workflow = ctx.ws.workflow();
    let todo = workflow
        .semantic_state("task", "todo")
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    let waiting = workflow
        .semantic_state("qa", "waiting")
        .map_err(|e| ExitError::new(1, e.to_string()))?;

    let mut task = Task::new(id, title, todo);
    task.description = description.unwrap_or_default().to_string();
    task.depends_on = depends_on.into_iter().map(TaskId::new).collect();
    task.tags = tags;
    task.owner = owner.map(str::to_string);
    task.session_id = session_id.map(SessionId::new);
    task.metadata.created_at = ctx.ws.now();
    task.metadata.updated_at = task.metadata.created_at.clone();
    task.metadata.created_by = owner.unwrap_or("edison").to_string();

    let path = ctx.ws.tasks().create(&task).map_err(store_error)?;

    let mut qa_created = false;
    if create_qa {
        let mut qa = QaRecord::for_task(&task.id, format!("QA: {title}"), waiting);
        qa.session_id = task.session_id.clone();
        qa.metadata = task.metadata.clone();
        ctx.ws.qa().create(&qa).map_err(store_error)?;
        qa_created = true;
    }

    if let Some(sid) = &task.session_id {
        register_in_session(ctx, sid.as_str(), &task, qa_created)?;
    }

    let payload = serde_json::json!({
        "taskId": task.id,
        "path": path,
        "qaCreated": qa_created,
    });
    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &payload, || {
            let mut md = format!("# Task {id}\n\nCreated in `todo`.\n");
            if qa_created {
                md.push_str("QA record created in `waiting`.\n");
            }
            md
        })
    );
    Ok(())
}

fn register_in_session(
    ctx: &Ctx,
    session_id: &str,
    task: &Task,
    qa_created: bool,
) -> Result<(), ExitError> {
    let Some(mut session) = ctx.ws.sessions().get(session_id).map_err(store_error)? else {
        return Err(ExitError::new(1, format!("session {session_id} not found")));
    };
    session.register_task(
        task.id.clone(),
        edison_core::SessionTaskRef {
            parent_id: task.parent_id.clone(),
            child_ids: task.child_ids.clone(),
            status: task.state.clone(),
            owner: task.owner.clone(),
        },
    );
    if qa_created {
        session.register_qa(
            task.id.qa_id(),
            edison_core::SessionQaRef {
                task_id: task.id.clone(),
                status: "waiting".to_string(),
            },
        );
    }
    session.log_activity(
        ctx.ws.now(),
        format!("task {} registered", task.id),
        Some(task.id.to_string()),
    );
    ctx.ws.sessions().update(&session).map_err(store_error)?;
    Ok(())
}

fn claim(
    ctx: &Ctx,
    id: &str,
    session_id: Option<&str>,
    owner: Option<&str>,
) -> Result<(), ExitError> {
    let machine = ctx.ws.machine().map_err(engine_error)?;
    let wip = ctx
        .ws
        .workflow()
        .semantic_state("task", "wip")
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    let mut task = machine
        .transition_task(id, &wip, Some("claimed"))
        .map_err(state_error)?;

    // Attach owner and session after the transition succeeded.
    let owner = owner
        .map(str::to_string)
        .or_else(|| std::env::var(edison_config::ENV_OWNER).ok().filter(|s| !s.is_empty()));
    let mut dirty = false;
    if owner.is_some() && task.owner != owner {
        task.owner = owner;
        dirty = true;
    }
    if let Some(sid) = session_id {
        if task.session_id.as_ref().map(|s| s.as_str()) != Some(sid) && task.session_id.is_none()
        {
            // Claiming into a session only binds metadata; the file stays
            // in its current tree until the session close moves it.
            tracing::debug!(task = id, session = sid, "claim noted session binding");
        }
    }
    if dirty {
        ctx.ws.tasks().update(&task).map_err(store_error)?;
    }

    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &serde_json::json!({"taskId": id, "state": task.state}), || {
            format!("# Task {id}\n\nClaimed: now `{}`.\n", task.state)
        })
    );
    Ok(())
}

fn ready(ctx: &Ctx, id: &str, skip_context7: bool) -> Result<(), ExitError> {
    if skip_context7 {
        let round = WorkflowEnv::current_round(&ctx.ws, id).max(1);
        ctx.ws
            .evidence()
            .write_context7_bypass(id, round, "task ready --skip-context7", &ctx.ws.now())
            .map_err(super::evidence_error)?;
    }

    let machine = ctx.ws.machine().map_err(engine_error)?;
    let done = ctx
        .ws
        .workflow()
        .semantic_state("task", "done")
        .map_err(|e| ExitError::new(1, e.to_string()))?;
    let task = machine
        .transition_task(id, &done, Some("evidence complete"))
        .map_err(state_error)?;

    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &serde_json::json!({"taskId": id, "state": task.state}), || {
            format!("# Task {id}\n\nPromoted to `{}`; QA advanced to `todo`.\n", task.state)
        })
    );
    Ok(())
}

fn status(ctx: &Ctx, id: &str) -> Result<(), ExitError> {
    let task = ctx
        .ws
        .tasks()
        .get(id)
        .map_err(store_error)?
        .ok_or_else(|| ExitError::new(1, format!("task {id} not found")))?;
    let graph = ctx.ws.task_graph().map_err(engine_error)?;
    let policy = ctx.ws.readiness_policy().map_err(engine_error)?;
    let evaluator = ReadinessEvaluator::new(&graph, &policy);
    let readiness = evaluator.evaluate_task(id);

    let payload = serde_json::json!({
        "task": {
            "id": task.id,
            "title": task.title,
            "state": task.state,
            "sessionId": task.session_id,
            "dependsOn": task.depends_on,
        },
        "ready": readiness.as_ref().map(|r| r.ready),
        "blockedBy": readiness.as_ref().map(|r| &r.blocked_by),
        "historyLen": task.state_history.len(),
    });
    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &payload, || {
            let mut md = format!(
                "# Task {}\n\n- Title: {}\n- State: {}\n",
                task.id, task.title, task.state
            );
            if let Some(readiness) = &readiness {
                if readiness.ready {
                    md.push_str("- Ready to claim\n");
                }
                md.push_str(&md_section(
                    "Blocked by",
                    &readiness
                        .blocked_by
                        .iter()
                        .map(|b| format!("{} ({})", b.dependency_id, b.reason))
                        .collect::<Vec<_>>(),
                ));
            }
            md
        })
    );
    Ok(())
}

fn blocked(ctx: &Ctx, session_id: Option<&str>) -> Result<(), ExitError> {
    let graph = ctx.ws.task_graph().map_err(engine_error)?;
    let policy = ctx.ws.readiness_policy().map_err(engine_error)?;
    let evaluator = ReadinessEvaluator::new(&graph, &policy);
    let scope = session_id.map(SessionId::new);
    let blocked = evaluator.blocked_tasks(scope.as_ref());

    let payload: Vec<serde_json::Value> = blocked
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.task.id,
                "title": r.task.title,
                "blockedBy": r.blocked_by,
            })
        })
        .collect();
    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &payload, || {
            if blocked.is_empty() {
                return "No blocked tasks.\n".to_string();
            }
            md_section(
                "Blocked tasks",
                &blocked
                    .iter()
                    .map(|r| {
                        let why: Vec<String> = r
                            .blocked_by
                            .iter()
                            .map(|b| format!("{} ({})", b.dependency_id, b.reason))
                            .collect();
                        format!("{}: {}", r.task.id, why.join(", "))
                    })
                    .collect::<Vec<_>>(),
            )
        })
    );
    Ok(())
}

fn similar(ctx: &Ctx, title: &str, description: &str) -> Result<(), ExitError> {
    let tasks = ctx.ws.tasks().find_all().map_err(store_error)?;
    let index = SimilarityIndex::new(
        tasks.iter().map(|t| SimilarityDoc {
            task_id: t.id.clone(),
            title: t.title.clone(),
            body: t.description.clone(),
            state: t.state.clone(),
            session_id: t.session_id.clone(),
        }),
        ctx.ws.task_config().similarity_weights(),
    );
    let matches = index.find_similar(title, description);

    let payload: Vec<serde_json::Value> = matches
        .iter()
        .map(|m| {
            serde_json::json!({
                "taskId": m.task_id,
                "score": (m.score * 100.0).round() / 100.0,
                "title": m.title,
                "state": m.state,
            })
        })
        .collect();
    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &payload, || {
            if matches.is_empty() {
                return "No similar tasks found.\n".to_string();
            }
            md_section(
                "Similar tasks",
                &matches
                    .iter()
                    .map(|m| format!("{} ({:.2}): {}", m.task_id, m.score, m.title))
                    .collect::<Vec<_>>(),
            )
        })
    );
    Ok(())
}
