// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! edison-compose: Layered markdown composition.
//!
//! Anchored include resolution, SECTION/CONCATENATE layer merging with
//! fence-aware dedup, the rules catalog, a content-addressed cache for
//! composed artifacts, and the platform adapter facade contract.

pub mod adapter;
pub mod cache;
pub mod dedup;
pub mod error;
pub mod includes;
pub mod rules;
pub mod scan;
pub mod sections;

pub use adapter::{sync_outputs, AdapterOutput, PlatformAdapter, GENERATED_TAG};
pub use cache::{ComposeCache, ManifestEntry, ENGINE_VERSION};
pub use dedup::{concatenate, DedupConfig, Layer};
pub use error::ComposeError;
pub use includes::{extract_anchor, IncludeResolver};
pub use rules::{merge_rules, parse_registry, render_injection, rules_for_context, RuleDef};
pub use sections::compose_sections;
