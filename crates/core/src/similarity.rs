// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic task similarity / duplicate detection.
//!
//! Jaccard overlap over title and body token sets, optionally over word
//! shingles, weighted per config. Reused by `task similar` and by follow-up
//! dedup in the session-next planner. No LLM involved.

use crate::id::{SessionId, TaskId};
use std::collections::BTreeSet;

/// Configured weights and thresholds.
#[derive(Debug, Clone)]
pub struct SimilarityWeights {
    pub shingle_size: usize,
    pub title_weight: f64,
    pub body_weight: f64,
    pub use_shingles: bool,
    pub threshold: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            shingle_size: 3,
            title_weight: 0.6,
            body_weight: 0.4,
            use_shingles: false,
            threshold: 0.55,
        }
    }
}

/// One indexed document (a task's text plus routing metadata).
#[derive(Debug, Clone)]
pub struct SimilarityDoc {
    pub task_id: TaskId,
    pub title: String,
    pub body: String,
    pub state: String,
    pub session_id: Option<SessionId>,
}

/// A scored match against the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMatch {
    pub task_id: TaskId,
    pub score: f64,
    pub title_score: f64,
    pub body_score: f64,
    pub title: String,
    pub state: String,
    pub session_id: Option<SessionId>,
}

/// Lowercase alphanumeric word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut word = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            word.extend(ch.to_lowercase());
        } else if !word.is_empty() {
            out.push(std::mem::take(&mut word));
        }
    }
    if !word.is_empty() {
        out.push(word);
    }
    out
}

/// Rolling word shingles of size `k` (empty when fewer than `k` tokens).
pub fn shingles(tokens: &[String], k: usize) -> BTreeSet<Vec<String>> {
    let k = k.max(1);
    if tokens.len() < k {
        return BTreeSet::new();
    }
    tokens.windows(k).map(|w| w.to_vec()).collect()
}

fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

struct Prepped {
    doc: SimilarityDoc,
    title_tokens: BTreeSet<String>,
    body_tokens: BTreeSet<String>,
    title_shingles: BTreeSet<Vec<String>>,
    body_shingles: BTreeSet<Vec<String>>,
}

/// Precomputed, reusable similarity index for project tasks.
pub struct SimilarityIndex {
    weights: SimilarityWeights,
    docs: Vec<Prepped>,
}

impl SimilarityIndex {
    pub fn new(docs: impl IntoIterator<Item = SimilarityDoc>, weights: SimilarityWeights) -> Self {
        let k = weights.shingle_size.max(1);
        let docs = docs
            .into_iter()
            .map(|doc| {
                let title_tokens = tokenize(&doc.title);
                let body_tokens = tokenize(&doc.body);
                Prepped {
                    title_shingles: shingles(&title_tokens, k),
                    body_shingles: shingles(&body_tokens, k),
                    title_tokens: title_tokens.into_iter().collect(),
                    body_tokens: body_tokens.into_iter().collect(),
                    doc,
                }
            })
            .collect();
        Self { weights, docs }
    }

    /// Score a candidate title/body against every indexed document.
    ///
    /// Results at or above the configured threshold, best first; ties break
    /// by task id for determinism.
    pub fn find_similar(&self, title: &str, body: &str) -> Vec<SimilarMatch> {
        let title_tokens = tokenize(title);
        let body_tokens = tokenize(body);
        let k = self.weights.shingle_size.max(1);
        let title_shingles = shingles(&title_tokens, k);
        let body_shingles = shingles(&body_tokens, k);
        let title_set: BTreeSet<String> = title_tokens.into_iter().collect();
        let body_set: BTreeSet<String> = body_tokens.into_iter().collect();

        let mut out: Vec<SimilarMatch> = Vec::new();
        for p in &self.docs {
            let (title_score, body_score) = if self.weights.use_shingles {
                (
                    jaccard(&title_shingles, &p.title_shingles),
                    jaccard(&body_shingles, &p.body_shingles),
                )
            } else {
                (
                    jaccard(&title_set, &p.title_tokens),
                    jaccard(&body_set, &p.body_tokens),
                )
            };
            let score = self.weights.title_weight * title_score
                + self.weights.body_weight * body_score;
            if score >= self.weights.threshold {
                out.push(SimilarMatch {
                    task_id: p.doc.task_id.clone(),
                    score,
                    title_score,
                    body_score,
                    title: p.doc.title.clone(),
                    state: p.doc.state.clone(),
                    session_id: p.doc.session_id.clone(),
                });
            }
        }
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.task_id.cmp(&b.task_id))
        });
        out
    }

    /// True when the candidate duplicates an indexed task.
    pub fn is_duplicate(&self, title: &str, body: &str) -> bool {
        !self.find_similar(title, body).is_empty()
    }
}

#[cfg(test)]
#[path = "similarity_tests.rs"]
mod tests;
