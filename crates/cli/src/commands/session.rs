// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison session …`

use super::{engine_error, store_error, Ctx};
use crate::exit_error::ExitError;
use crate::output::{md_section, render, OutputFormat};
use clap::Subcommand;
use edison_engine::{compute_next, SessionManager};

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Create a session (explicit or inferred id) with an optional worktree
    Create {
        #[arg(long)]
        session_id: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Skip git-worktree materialisation
        #[arg(long)]
        no_worktree: bool,
    },
    /// Show a session's state, tasks, and activity
    Status {
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Compute the next best actions for a session
    Next {
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Close the session: move scoped records to the global tree
    Complete {
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Refresh session git metadata from the repository
    SyncGit {
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Restore a missing or archived worktree
    WorktreeRestore {
        #[arg(long)]
        session_id: Option<String>,
    },
}

pub async fn run(cmd: SessionCmd, ctx: &Ctx) -> Result<(), ExitError> {
    match cmd {
        SessionCmd::Create {
            session_id,
            owner,
            no_worktree,
        } => {
            let manager = SessionManager::new(&ctx.ws);
            let outcome = manager
                .create(session_id.as_deref(), owner.as_deref(), no_worktree)
                .await
                .map_err(engine_error)?;
            let format = ctx.format(OutputFormat::Markdown);
            println!(
                "{}",
                render(format, &outcome, || {
                    let mut md = format!("# Session {}\n\nCreated.\n", outcome.session_id);
                    if let Some(worktree) = &outcome.worktree_path {
                        md.push_str(&format!("\n- Worktree: `{}`\n", worktree.display()));
                    }
                    if outcome.worktree_pinned {
                        md.push_str("- Pin file written (`.project/.session-id`)\n");
                    }
                    md
                })
            );
            Ok(())
        }
        SessionCmd::Status { session_id } => {
            let id = ctx.resolve_session(session_id.as_deref())?;
            let session = ctx
                .ws
                .sessions()
                .get(&id)
                .map_err(store_error)?
                .ok_or_else(|| ExitError::new(1, format!("session {id} not found")))?;
            let format = ctx.format(OutputFormat::Markdown);
            println!(
                "{}",
                render(format, &session, || {
                    let mut md = format!("# Session {}\n\n- State: {}\n", session.id, session.state);
                    if let Some(owner) = &session.owner {
                        md.push_str(&format!("- Owner: {owner}\n"));
                    }
                    if let Some(worktree) = &session.git.worktree_path {
                        md.push_str(&format!("- Worktree: `{}`\n", worktree.display()));
                    }
                    md.push('\n');
                    md.push_str(&md_section(
                        "Tasks",
                        &session
                            .tasks
                            .iter()
                            .map(|(id, t)| format!("{id} ({})", t.status))
                            .collect::<Vec<_>>(),
                    ));
                    md.push_str(&md_section(
                        "Recent activity",
                        &session
                            .activity_log
                            .iter()
                            .rev()
                            .take(10)
                            .map(|a| format!("{}: {}", a.ts, a.message))
                            .collect::<Vec<_>>(),
                    ));
                    md
                })
            );
            Ok(())
        }
        SessionCmd::Next { session_id } => {
            let id = ctx.resolve_session(session_id.as_deref())?;
            let plan = compute_next(&ctx.ws, &id).map_err(engine_error)?;
            let format = ctx.format(OutputFormat::Markdown);
            println!(
                "{}",
                render(format, &plan, || {
                    let mut md = format!("# Next actions for {}\n\n", plan.session_id);
                    md.push_str(&md_section(
                        "Actions",
                        &plan
                            .actions
                            .iter()
                            .map(|a| {
                                let cmd = a.cmd.join(" ");
                                match (&a.task_id, a.wave) {
                                    (Some(t), Some(w)) => {
                                        format!("{} {t} (wave {w}): `{cmd}`", a.action)
                                    }
                                    (Some(t), None) => format!("{} {t}: `{cmd}`", a.action),
                                    _ => format!("{}: `{cmd}`", a.action),
                                }
                            })
                            .collect::<Vec<_>>(),
                    ));
                    md.push_str(&md_section(
                        "Blockers",
                        &plan
                            .blockers
                            .iter()
                            .map(|b| {
                                let why: Vec<String> = b
                                    .blocked_by
                                    .iter()
                                    .map(|d| format!("{} ({})", d.dependency_id, d.reason))
                                    .collect();
                                format!("{}: {}", b.task_id, why.join(", "))
                            })
                            .collect::<Vec<_>>(),
                    ));
                    md.push_str(&md_section(
                        "Missing reports",
                        &plan
                            .reports_missing
                            .iter()
                            .map(|r| format!("{}: {}", r.task_id, r.filename))
                            .collect::<Vec<_>>(),
                    ));
                    md.push_str(&md_section(
                        "Follow-ups",
                        &plan
                            .follow_ups_plan
                            .iter()
                            .map(|s| match &s.duplicate_of {
                                Some(dup) => {
                                    format!("{} (possible duplicate of {dup})", s.title)
                                }
                                None => format!("{}: `{}`", s.title, s.cmd.join(" ")),
                            })
                            .collect::<Vec<_>>(),
                    ));
                    md.push_str(&md_section("Recommendations", &plan.recommendations));
                    md
                })
            );
            Ok(())
        }
        SessionCmd::Complete { session_id } => {
            let id = ctx.resolve_session(session_id.as_deref())?;
            let manager = SessionManager::new(&ctx.ws);
            let report = manager.complete(&id).map_err(engine_error)?;
            let format = ctx.format(OutputFormat::Markdown);
            println!(
                "{}",
                render(format, &report, || {
                    format!(
                        "# Session {} closed\n\n- Tasks moved: {}\n- QA moved: {}\n- Journal: `{}`\n",
                        report.session_id,
                        report.moved_tasks.len(),
                        report.moved_qa.len(),
                        report.journal_dir.display()
                    )
                })
            );
            Ok(())
        }
        SessionCmd::SyncGit { session_id } => {
            let id = ctx.resolve_session(session_id.as_deref())?;
            let manager = SessionManager::new(&ctx.ws);
            let session = manager.sync_git(&id).await.map_err(engine_error)?;
            let format = ctx.format(OutputFormat::Markdown);
            println!(
                "{}",
                render(format, &session.git, || {
                    match &session.git.worktree_path {
                        Some(w) => format!("Worktree registered: `{}`\n", w.display()),
                        None => "No worktree registered for this session.\n".to_string(),
                    }
                })
            );
            Ok(())
        }
        SessionCmd::WorktreeRestore { session_id } => {
            let id = ctx.resolve_session(session_id.as_deref())?;
            let manager = SessionManager::new(&ctx.ws);
            let worktree = manager.worktree_restore(&id).await.map_err(engine_error)?;
            match worktree {
                Some(path) => println!("Worktree ready: {}", path.display()),
                None => println!("Worktrees are disabled or this is not a git repository."),
            }
            Ok(())
        }
    }
}
