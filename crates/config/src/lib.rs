// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! edison-config: Layered YAML configuration and path resolution.
//!
//! A registry merges the bundled core defaults with user, extra, project,
//! and project-local overlay layers (plus per-layer packs), then hands the
//! merged tree to typed domain views. Path resolution knows the fixed
//! `.edison/` / `.project/` layout and the worktree pin file.

pub mod domains;
pub mod error;
pub mod glob_match;
pub mod layers;
pub mod paths;
pub mod registry;
pub mod value;

pub use domains::{
    AdaptersConfig, CompositionConfig, Context7Config, PackageSpec, PresetSpec, QaConfig,
    ResilienceConfig, RetryConfig, SessionConfig, StateSpec, TaskConfig, TransitionSpec,
    ValidationConfig, ValidatorSpec, WaveSpec, WebServerSpec, WorkflowConfig,
};
pub use error::{ConfigError, RootError};
pub use layers::{resolve_layer_stack, LayerSpec, LayerStack};
pub use paths::{
    PathResolver, ENV_OWNER, ENV_PROJECT_ROOT, ENV_SESSION, GENERATED_DIR, LEGACY_CONFIG_DIR,
    MANAGEMENT_DIR, PROJECT_CONFIG_DIR, SESSION_ID_FILE,
};
pub use registry::{clear_all_caches, ConfigRegistry};
