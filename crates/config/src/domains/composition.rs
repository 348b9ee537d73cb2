// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition domain: include depth and dedup tuning.

use crate::value::u64_or;
use serde_yaml::Value;

/// Read-through view of `composition.*`.
#[derive(Debug, Clone, Copy)]
pub struct CompositionConfig<'a> {
    cfg: &'a Value,
}

impl<'a> CompositionConfig<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    /// Maximum nested include depth (default 3).
    pub fn max_include_depth(&self) -> usize {
        u64_or(self.cfg, "composition.includes.maxDepth", 3) as usize
    }

    /// Rolling shingle size for paragraph dedup (default 12).
    pub fn dedup_shingle_size(&self) -> usize {
        (u64_or(self.cfg, "composition.dedup.shingleSize", 12) as usize).max(1)
    }

    /// Minimum word count before a paragraph participates in dedup
    /// (default 3).
    pub fn dedup_min_paragraph_words(&self) -> usize {
        u64_or(self.cfg, "composition.dedup.minParagraphWords", 3) as usize
    }
}
