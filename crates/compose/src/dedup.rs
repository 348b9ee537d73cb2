// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paragraph-level deduplication for CONCATENATE composition.
//!
//! Layers concatenate core → packs (active order) → project overlay.
//! A paragraph is dropped when it shares a rolling word shingle with any
//! higher-priority layer, so duplicated guidance survives exactly once:
//! in the highest layer that carries it. Fenced code blocks are atomic and
//! never split or partially deduped.

use crate::scan::split_paragraphs;
use std::collections::BTreeSet;

/// Dedup tuning (defaults: `k = 12`, `min = 3`).
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub shingle_size: usize,
    pub min_paragraph_words: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            shingle_size: 12,
            min_paragraph_words: 3,
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Shingle set for a paragraph. Paragraphs shorter than `k` words fall
/// back to a single whole-paragraph shingle once they reach `min` words;
/// anything shorter never participates in dedup.
fn shingles(tokens: &[String], cfg: &DedupConfig) -> BTreeSet<Vec<String>> {
    let k = cfg.shingle_size.max(1);
    if tokens.len() >= k {
        tokens.windows(k).map(|w| w.to_vec()).collect()
    } else if tokens.len() >= cfg.min_paragraph_words {
        std::iter::once(tokens.to_vec()).collect()
    } else {
        BTreeSet::new()
    }
}

/// One named layer, low → high priority.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub content: String,
}

impl Layer {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Concatenate layers with shingle dedup against higher-priority layers.
pub fn concatenate(layers: &[Layer], cfg: &DedupConfig) -> String {
    struct Prepped {
        paragraphs: Vec<(String, BTreeSet<Vec<String>>)>,
    }

    let prepped: Vec<Prepped> = layers
        .iter()
        .map(|layer| Prepped {
            paragraphs: split_paragraphs(&layer.content)
                .into_iter()
                .map(|p| {
                    let tokens = tokenize(&p);
                    let s = shingles(&tokens, cfg);
                    (p, s)
                })
                .collect(),
        })
        .collect();

    let mut out = String::new();
    for (i, layer) in prepped.iter().enumerate() {
        for (paragraph, paragraph_shingles) in &layer.paragraphs {
            let duplicated = !paragraph_shingles.is_empty()
                && prepped[i + 1..].iter().any(|higher| {
                    higher.paragraphs.iter().any(|(_, hs)| {
                        !hs.is_disjoint(paragraph_shingles)
                    })
                });
            if duplicated {
                tracing::debug!(layer = %layers[i].name, "dropping duplicated paragraph");
                continue;
            }
            out.push_str(paragraph.trim_end_matches('\n'));
            out.push_str("\n\n");
        }
    }
    out.trim_end_matches('\n').to_string() + "\n"
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod tests;
