// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `edison compose …`

use super::Ctx;
use crate::exit_error::ExitError;
use clap::{Args, Subcommand};
use edison_compose::{concatenate, ComposeCache, DedupConfig, IncludeResolver, Layer};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ComposeCmd {
    /// Compose every selected artifact kind into `_generated/`
    All(ComposeArgs),
}

#[derive(Args)]
pub struct ComposeArgs {
    /// Compose guideline documents
    #[arg(long)]
    pub guidelines: bool,
    /// Compose validator specs
    #[arg(long)]
    pub validators: bool,
    /// Compose constitution documents
    #[arg(long)]
    pub constitutions: bool,
    /// Compose hook definitions
    #[arg(long)]
    pub hooks: bool,
}

impl ComposeArgs {
    /// With no selector flags, compose everything.
    fn kinds(&self) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        if self.guidelines {
            kinds.push("guidelines");
        }
        if self.validators {
            kinds.push("validators");
        }
        if self.constitutions {
            kinds.push("constitutions");
        }
        if self.hooks {
            kinds.push("hooks");
        }
        if kinds.is_empty() {
            kinds = vec!["guidelines", "validators", "constitutions", "hooks"];
        }
        kinds
    }
}

pub fn run(cmd: ComposeCmd, ctx: &Ctx) -> Result<(), ExitError> {
    let ComposeCmd::All(args) = cmd;
    let composition = edison_config::CompositionConfig::new(ctx.ws.registry().merged());
    let resolver = IncludeResolver::new(ctx.ws.root(), composition.max_include_depth());
    let dedup = DedupConfig {
        shingle_size: composition.dedup_shingle_size(),
        min_paragraph_words: composition.dedup_min_paragraph_words(),
    };
    let cache = ComposeCache::new(&ctx.ws.resolver().generated_dir());

    for kind in args.kinds() {
        let layers = collect_layers(ctx, kind, &resolver)?;
        if layers.iter().all(|(l, _)| l.content.trim().is_empty()) {
            tracing::debug!(kind, "no sources, skipping");
            continue;
        }
        let mut deps: Vec<PathBuf> = Vec::new();
        let contents: Vec<Layer> = layers
            .into_iter()
            .map(|(layer, layer_deps)| {
                deps.extend(layer_deps);
                layer
            })
            .collect();
        let merged = concatenate(&contents, &dedup);
        let key = format!("{kind}.md");
        let (_, cached) = cache
            .compose(&key, kind, &deps, || Ok(merged))
            .map_err(|e| ExitError::new(1, e.to_string()))?;
        println!(
            "Composed {kind} -> `_generated/{key}`{}",
            if cached { " (cache hit)" } else { "" }
        );
    }
    Ok(())
}

/// Read one kind's markdown sources per layer, low → high:
/// non-project layers, then active packs, then the project overlay.
fn collect_layers(
    ctx: &Ctx,
    kind: &str,
    resolver: &IncludeResolver,
) -> Result<Vec<(Layer, Vec<PathBuf>)>, ExitError> {
    let stack = ctx.ws.registry().stack();
    let mut sources: Vec<(String, PathBuf)> = Vec::new();
    for layer_spec in &stack.layers {
        if layer_spec.id == "project" {
            continue;
        }
        sources.push((layer_spec.id.clone(), layer_spec.path.join(kind)));
    }
    for (owner, packs_root) in stack.pack_roots() {
        let Ok(entries) = std::fs::read_dir(&packs_root) else {
            continue;
        };
        let mut packs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        packs.sort();
        for pack in packs {
            let name = pack
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            sources.push((format!("{owner}:{name}"), pack.join(kind)));
        }
    }
    if let Some(project) = stack.layers.iter().find(|l| l.id == "project") {
        sources.push(("project".to_string(), project.path.join(kind)));
    }

    let mut out = Vec::new();
    for (name, dir) in sources {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "md").unwrap_or(false))
            .collect();
        files.sort();

        let mut content = String::new();
        let mut deps = Vec::new();
        for file in files {
            let raw = std::fs::read_to_string(&file).map_err(|e| {
                ExitError::new(1, format!("failed to read {}: {e}", file.display()))
            })?;
            deps.push(file.clone());
            let (expanded, include_deps) = resolver
                .resolve(&raw, &file)
                .map_err(|e| ExitError::new(1, e.to_string()))?;
            deps.extend(include_deps);
            content.push_str(&expanded);
            if !content.ends_with('\n') {
                content.push('\n');
            }
            content.push('\n');
        }
        out.push((Layer::new(name, content), deps));
    }
    Ok(out)
}
