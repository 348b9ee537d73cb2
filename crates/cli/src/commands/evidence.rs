// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison evidence …`

use super::{evidence_error, Ctx};
use crate::exit_error::{ExitError, EXIT_SCRIPT_NOT_FOUND};
use crate::output::{md_fix_line, render, OutputFormat};
use clap::Subcommand;
use edison_store::{CommandEvidence, CommandHeader, Context7Marker};

#[derive(Subcommand)]
pub enum EvidenceCmd {
    /// Open round 1 for a task (no-op when a round already exists)
    Init { task_id: String },
    /// Run a configured CI command and capture its output as evidence
    Capture {
        task_id: String,
        /// Command short name (resolves `qa.evidence.ciCommands.{name}`)
        #[arg(long)]
        name: String,
        /// Override the configured command line
        #[arg(long)]
        command: Option<String>,
    },
    /// Show evidence completeness for the current round
    Status { task_id: String },
    /// Context7 documentation snapshot helpers
    #[command(subcommand)]
    Context7(Context7Cmd),
}

#[derive(Subcommand)]
pub enum Context7Cmd {
    /// Print an empty marker template for a package
    Template { package: String },
    /// Save a documentation snapshot from stdin
    Save {
        task_id: String,
        #[arg(long)]
        package: String,
        #[arg(long)]
        library_id: String,
        #[arg(long)]
        topics: Vec<String>,
    },
    /// List captured packages for the current round
    List { task_id: String },
}

pub async fn run(cmd: EvidenceCmd, ctx: &Ctx) -> Result<(), ExitError> {
    match cmd {
        EvidenceCmd::Init { task_id } => {
            let dir = ctx
                .ws
                .evidence()
                .ensure_round(&task_id, 1)
                .map_err(evidence_error)?;
            println!("Evidence round ready: {}", dir.display());
            Ok(())
        }
        EvidenceCmd::Capture {
            task_id,
            name,
            command,
        } => capture(ctx, &task_id, &name, command.as_deref()).await,
        EvidenceCmd::Status { task_id } => status(ctx, &task_id),
        EvidenceCmd::Context7(cmd) => context7(cmd, ctx),
    }
}

async fn capture(
    ctx: &Ctx,
    task_id: &str,
    name: &str,
    command_override: Option<&str>,
) -> Result<(), ExitError> {
    ctx.enforce_worktree("evidence capture", None)?;

    let command = match command_override {
        Some(c) => c.to_string(),
        None => ctx.ws.qa_config().ci_command(name).ok_or_else(|| {
            ExitError::new(
                1,
                format!("no CI command configured for {name:?} (qa.evidence.ciCommands)"),
            )
        })?,
    };

    let round = match ctx.ws.evidence().current_round(task_id) {
        0 => {
            ctx.ws
                .evidence()
                .ensure_round(task_id, 1)
                .map_err(evidence_error)?;
            1
        }
        n => n,
    };

    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(&command)
        .current_dir(&ctx.cwd)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExitError::new(EXIT_SCRIPT_NOT_FOUND, format!("script not found: {command}"))
            } else {
                ExitError::new(1, e.to_string())
            }
        })?;
    let exit_code = output.status.code().unwrap_or(-1);
    // `sh -c` reports a missing binary as 127.
    if exit_code == 127 {
        return Err(
            ExitError::new(EXIT_SCRIPT_NOT_FOUND, format!("script not found: {command}"))
                .with_code("script_not_found"),
        );
    }

    let mut body = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        body.push_str("\n--- stderr ---\n");
        body.push_str(&stderr);
    }

    let evidence = CommandEvidence {
        header: CommandHeader {
            evidence_version: 1,
            evidence_kind: "command".to_string(),
            task_id: task_id.to_string(),
            round,
            command_name: name.to_string(),
            command: command.clone(),
            cwd: ctx.cwd.clone(),
            exit_code,
        },
        output: body,
    };
    let path = ctx
        .ws
        .evidence()
        .write_command(task_id, &evidence)
        .map_err(evidence_error)?;

    let payload = serde_json::json!({
        "taskId": task_id,
        "round": round,
        "commandName": name,
        "exitCode": exit_code,
        "path": path,
    });
    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &payload, || {
            format!(
                "# Evidence captured\n\n- Command: `{command}`\n- Exit code: {exit_code}\n- File: `{}`\n",
                path.display()
            )
        })
    );
    Ok(())
}

fn status(ctx: &Ctx, task_id: &str) -> Result<(), ExitError> {
    let round = ctx.ws.evidence().current_round(task_id);
    let blockers = ctx.ws.evidence().missing_evidence_blockers(task_id);
    let payload = serde_json::json!({
        "taskId": task_id,
        "round": round,
        "complete": blockers.is_empty(),
        "blockers": blockers,
    });
    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &payload, || {
            if round == 0 {
                return format!(
                    "# Evidence: {task_id}\n\nNo round yet.\n\n  Fix: `edison evidence init {task_id}`\n"
                );
            }
            let mut md = format!("# Evidence: {task_id} (round {round})\n\n");
            if blockers.is_empty() {
                md.push_str("All required evidence present.\n");
            } else {
                for b in &blockers {
                    md.push_str(&format!("- {}: {}\n", b.filename, b.message));
                    if let Some(fix) = &b.fix {
                        md.push_str(&md_fix_line(fix));
                    }
                }
            }
            md
        })
    );
    Ok(())
}

fn context7(cmd: Context7Cmd, ctx: &Ctx) -> Result<(), ExitError> {
    match cmd {
        Context7Cmd::Template { package } => {
            let marker = Context7Marker {
                package: package.clone(),
                library_id: format!("/org/{package}"),
                topics: Vec::new(),
                queried_at: ctx.ws.now(),
            };
            let text = marker
                .render("<!-- paste documentation snapshot here -->")
                .map_err(evidence_error)?;
            println!("{text}");
            Ok(())
        }
        Context7Cmd::Save {
            task_id,
            package,
            library_id,
            topics,
        } => {
            let mut docs = String::new();
            use std::io::Read;
            std::io::stdin()
                .read_to_string(&mut docs)
                .map_err(|e| ExitError::new(1, e.to_string()))?;
            let round = ctx.ws.evidence().current_round(&task_id).max(1);
            let marker = Context7Marker {
                package,
                library_id,
                topics,
                queried_at: ctx.ws.now(),
            };
            let path = ctx
                .ws
                .evidence()
                .write_context7(&task_id, round, &marker, &docs)
                .map_err(evidence_error)?;
            println!("Saved {}", path.display());
            Ok(())
        }
        Context7Cmd::List { task_id } => {
            let round = ctx.ws.evidence().current_round(&task_id);
            let packages = ctx.ws.evidence().list_context7_packages(&task_id, round);
            if packages.is_empty() {
                println!("No context7 snapshots for round {round}.");
            } else {
                for p in packages {
                    println!("{p}");
                }
            }
            Ok(())
        }
    }
}
