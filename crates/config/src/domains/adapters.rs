// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters domain: platform output selection for the adapter facade.

use crate::value::{optional_str_list, str_or};
use serde_yaml::Value;

/// Read-through view of `adapters.*`.
#[derive(Debug, Clone, Copy)]
pub struct AdaptersConfig<'a> {
    cfg: &'a Value,
}

impl<'a> AdaptersConfig<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    /// Enabled platform adapters (`claude`, `codex`, `opencode`, …).
    pub fn platforms(&self) -> Vec<String> {
        optional_str_list(self.cfg, "adapters.platforms").unwrap_or_default()
    }

    /// Optional filename prefix for generated outputs.
    pub fn prefix(&self) -> String {
        str_or(self.cfg, "adapters.prefix", "")
    }
}
