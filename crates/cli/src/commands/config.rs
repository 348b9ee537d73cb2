// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison config …`

use super::Ctx;
use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Lint the merged configuration (strict keys, validator rules, …)
    Validate,
    /// Print the merged configuration
    Show {
        /// Dotted key path (e.g. `validation.waves`)
        #[arg(long)]
        key: Option<String>,
    },
}

pub fn run(cmd: ConfigCmd, ctx: &Ctx) -> Result<(), ExitError> {
    match cmd {
        ConfigCmd::Validate => validate(ctx),
        ConfigCmd::Show { key } => show(ctx, key.as_deref()),
    }
}

fn validate(ctx: &Ctx) -> Result<(), ExitError> {
    let mut problems: Vec<String> = Vec::new();

    if let Err(e) = ctx.ws.registry().validate_strict() {
        problems.push(e.to_string());
    }
    if let Err(e) = ctx.ws.validation_config().lint() {
        problems.push(e.to_string());
    }
    // Every wave referenced by a validator must exist.
    match (
        ctx.ws.validation_config().validators(),
        ctx.ws.validation_config().waves(),
    ) {
        (Ok(validators), Ok(waves)) => {
            for (id, spec) in &validators {
                if !waves.iter().any(|w| w.name == spec.wave) {
                    problems.push(format!(
                        "validator '{id}' references unknown wave '{}'",
                        spec.wave
                    ));
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => problems.push(e.to_string()),
    }
    // The workflow model must load (state dirs, transitions).
    if let Err(e) = edison_state::WorkflowModel::load(&ctx.ws.workflow()) {
        problems.push(e.to_string());
    }
    // Structural invariants over the entity trees.
    let integrity = edison_engine::verify_workspace(&ctx.ws);
    for finding in &integrity.findings {
        problems.push(format!(
            "[{}] {}: {}",
            finding.category, finding.entity_id, finding.message
        ));
    }

    if problems.is_empty() {
        println!("Configuration OK.");
        Ok(())
    } else {
        let mut message = String::from("configuration invalid:\n");
        for p in &problems {
            message.push_str(&format!("  - {p}\n"));
        }
        Err(ExitError::new(1, message).with_code("config_invalid"))
    }
}

fn show(ctx: &Ctx, key: Option<&str>) -> Result<(), ExitError> {
    let merged = ctx.ws.registry().merged();
    let value = match key {
        Some(key) => edison_config::value::lookup(merged, key)
            .ok_or_else(|| ExitError::new(1, format!("unknown configuration key: {key}")))?,
        None => merged,
    };
    // Config output defaults to YAML.
    let format = ctx.format(OutputFormat::Yaml);
    println!(
        "{}",
        render(format, value, || {
            serde_yaml::to_string(value).unwrap_or_default()
        })
    );
    Ok(())
}
