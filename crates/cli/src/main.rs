// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! edison: CLI surface over the workflow engine.

mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use commands::Ctx;
use exit_error::ExitError;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "edison",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")"),
    about = "Development-workflow orchestration engine for AI coding agents"
)]
struct Cli {
    /// Output format (defaults are command-specific, never JSON)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Back-compat alias for --format json
    #[arg(long, global = true)]
    json: bool,

    /// Override project root resolution
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Session lifecycle: create, status, next, complete, worktrees
    #[command(subcommand)]
    Session(commands::session::SessionCmd),
    /// Task lifecycle: create, claim, ready, status, blocked, similar
    #[command(subcommand)]
    Task(commands::task::TaskCmd),
    /// QA: validator runs, bundles, promotion, rounds
    #[command(subcommand)]
    Qa(commands::qa::QaCmd),
    /// Evidence rounds and command captures
    #[command(subcommand)]
    Evidence(commands::evidence::EvidenceCmd),
    /// Composed rules: injection, composition, current set
    #[command(subcommand)]
    Rules(commands::rules::RulesCmd),
    /// Configuration: validate and show
    #[command(subcommand)]
    Config(commands::config::ConfigCmd),
    /// Compose artifacts (guidelines, validators, …)
    #[command(subcommand)]
    Compose(commands::compose::ComposeCmd),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;
    let json = cli.json;
    if let Err(err) = run(cli).await {
        let effective = output::effective_format(format, json, OutputFormat::Markdown);
        match effective {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&err.envelope())
                        .unwrap_or_else(|_| "{\"success\":false}".to_string())
                );
            }
            _ => {
                eprintln!("Error: {err}");
            }
        }
        std::process::exit(err.code);
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let cwd = std::env::current_dir().map_err(|e| ExitError::new(1, e.to_string()))?;
    let ctx = Ctx::bootstrap(cli.project_root.as_deref(), &cwd, cli.format, cli.json)?;

    match cli.command {
        Command::Session(cmd) => commands::session::run(cmd, &ctx).await,
        Command::Task(cmd) => commands::task::run(cmd, &ctx).await,
        Command::Qa(cmd) => commands::qa::run(cmd, &ctx).await,
        Command::Evidence(cmd) => commands::evidence::run(cmd, &ctx).await,
        Command::Rules(cmd) => commands::rules::run(cmd, &ctx),
        Command::Config(cmd) => commands::config::run(cmd, &ctx),
        Command::Compose(cmd) => commands::compose::run(cmd, &ctx),
    }
}
