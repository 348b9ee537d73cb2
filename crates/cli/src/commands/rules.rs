// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison rules …`

use super::Ctx;
use crate::exit_error::ExitError;
use crate::output::{render, OutputFormat};
use clap::Subcommand;
use edison_compose::{
    extract_anchor, merge_rules, parse_registry, render_injection, rules_for_context, RuleDef,
};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum RulesCmd {
    /// Render injection text for the applicable rules
    Inject {
        /// Category filter (e.g. testing, architecture)
        #[arg(long)]
        context: Option<String>,
        /// Transition filter, `from->to` (advisory keying only)
        #[arg(long)]
        transition: Option<String>,
        /// Entity state filter (advisory keying only)
        #[arg(long)]
        state: Option<String>,
    },
    /// Compose the merged rules catalog into `_generated/`
    Compose,
    /// Show the merged rule set
    Current {
        #[arg(long)]
        context: Option<String>,
    },
}

pub fn run(cmd: RulesCmd, ctx: &Ctx) -> Result<(), ExitError> {
    match cmd {
        RulesCmd::Inject {
            context,
            transition,
            state,
        } => inject(ctx, context.as_deref(), transition.as_deref(), state.as_deref()),
        RulesCmd::Compose => compose(ctx),
        RulesCmd::Current { context } => current(ctx, context.as_deref()),
    }
}

/// Registry files low → high across the layer stack.
fn registry_paths(ctx: &Ctx) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for layer in &ctx.ws.registry().stack().layers {
        paths.push(layer.path.join("rules").join("registry.yml"));
    }
    // Legacy overlay dir is read-only but still consulted.
    paths.push(ctx.ws.resolver().legacy_config_dir().join("rules/registry.yml"));
    paths
}

fn load_rules(ctx: &Ctx) -> Result<Vec<RuleDef>, ExitError> {
    let mut layers = Vec::new();
    for path in registry_paths(ctx) {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let rules =
            parse_registry(&path, &content).map_err(|e| ExitError::new(1, e.to_string()))?;
        layers.push(rules);
    }
    Ok(merge_rules(&layers))
}

/// Rule body: guidance text, or the anchored span of its source file.
fn rule_body(ctx: &Ctx, rule: &RuleDef) -> String {
    if let Some(guidance) = &rule.guidance {
        return guidance.clone();
    }
    let Some(source) = &rule.source else {
        return String::new();
    };
    let path = ctx.ws.resolver().project_config_dir().join(&source.file);
    let Ok(text) = std::fs::read_to_string(&path) else {
        return String::new();
    };
    match &source.anchor {
        Some(anchor) => extract_anchor(&text, anchor).unwrap_or_default(),
        None => text,
    }
}

fn inject(
    ctx: &Ctx,
    context: Option<&str>,
    transition: Option<&str>,
    state: Option<&str>,
) -> Result<(), ExitError> {
    let rules = load_rules(ctx)?;
    let applicable = rules_for_context(&rules, context);

    let mut md = String::new();
    if let Some(transition) = transition {
        md.push_str(&format!("<!-- transition: {transition} -->\n"));
    }
    if let Some(state) = state {
        md.push_str(&format!("<!-- state: {state} -->\n"));
    }
    for rule in &applicable {
        md.push_str(&render_injection(rule, &rule_body(ctx, rule)));
        md.push('\n');
    }

    let payload: Vec<&RuleDef> = applicable;
    let format = ctx.format(OutputFormat::Markdown);
    println!("{}", render(format, &payload, || md.clone()));
    Ok(())
}

fn compose(ctx: &Ctx) -> Result<(), ExitError> {
    let rules = load_rules(ctx)?;
    let cache = edison_compose::ComposeCache::new(&ctx.ws.resolver().generated_dir());
    let deps: Vec<PathBuf> = registry_paths(ctx)
        .into_iter()
        .filter(|p| p.is_file())
        .collect();

    let rendered: String = rules
        .iter()
        .map(|r| render_injection(r, &rule_body(ctx, r)))
        .collect::<Vec<_>>()
        .join("\n");
    let (content, cached) = cache
        .compose("rules.md", "", &deps, || Ok(rendered))
        .map_err(|e| ExitError::new(1, e.to_string()))?;

    println!(
        "Composed {} rule(s) into `_generated/rules.md`{}",
        rules.len(),
        if cached { " (cache hit)" } else { "" }
    );
    tracing::debug!(bytes = content.len(), "rules composed");
    Ok(())
}

fn current(ctx: &Ctx, context: Option<&str>) -> Result<(), ExitError> {
    let rules = load_rules(ctx)?;
    let applicable = rules_for_context(&rules, context);
    let format = ctx.format(OutputFormat::Markdown);
    println!(
        "{}",
        render(format, &applicable, || {
            let mut md = String::from("# Rules\n\n");
            for rule in &applicable {
                let marker = if rule.blocking { " [BLOCKING]" } else { "" };
                md.push_str(&format!("- {}{}: {}\n", rule.id, marker, rule.title));
            }
            md
        })
    );
    Ok(())
}
