// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context7 package-documentation snapshot markers.

use crate::error::EvidenceError;
use crate::frontmatter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frontmatter of a `context7-{package}.md` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context7Marker {
    pub package: String,
    /// Library id in `/org/repo` form.
    pub library_id: String,
    #[serde(default)]
    pub topics: Vec<String>,
    /// RFC 3339 timestamp of the documentation query.
    pub queried_at: String,
}

impl Context7Marker {
    pub fn file_name(package: &str) -> String {
        format!("context7-{package}.md")
    }

    pub fn parse(path: &Path, text: &str) -> Result<(Self, String), EvidenceError> {
        frontmatter::parse(text).map_err(|message| EvidenceError::MalformedEvidence {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn render(&self, docs: &str) -> Result<String, EvidenceError> {
        frontmatter::render(self, docs).map_err(|e| EvidenceError::MalformedEvidence {
            path: std::path::PathBuf::from(Self::file_name(&self.package)),
            message: e.to_string(),
        })
    }
}
