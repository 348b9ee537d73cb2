// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Captured CI command output (`command-{name}.txt`).
//!
//! The file MUST begin with a `---` delimited YAML header carrying the
//! evidence contract; a missing or malformed header is a parse error that
//! guards consume fail-closed.

use crate::error::EvidenceError;
use crate::frontmatter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Required header of a command evidence file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandHeader {
    pub evidence_version: u32,
    pub evidence_kind: String,
    pub task_id: String,
    pub round: u32,
    pub command_name: String,
    pub command: String,
    pub cwd: PathBuf,
    pub exit_code: i32,
}

/// Parsed command evidence: header plus captured stdout/stderr.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEvidence {
    pub header: CommandHeader,
    pub output: String,
}

impl CommandEvidence {
    /// Evidence filename for a command short name.
    pub fn file_name(command_name: &str) -> String {
        format!("command-{command_name}.txt")
    }

    /// Short name from an evidence filename, if it follows the convention.
    pub fn command_name_of(file_name: &str) -> Option<&str> {
        file_name
            .strip_prefix("command-")
            .and_then(|rest| rest.strip_suffix(".txt"))
    }

    /// Strict parse. Fail-closed on any missing or malformed header.
    pub fn parse(path: &Path, text: &str) -> Result<Self, EvidenceError> {
        if frontmatter::split(text).is_none() {
            return Err(EvidenceError::MissingFrontmatter {
                path: path.to_path_buf(),
            });
        }
        let (header, output): (CommandHeader, String) =
            frontmatter::parse(text).map_err(|message| EvidenceError::MalformedEvidence {
                path: path.to_path_buf(),
                message,
            })?;
        if header.evidence_version != 1 {
            return Err(EvidenceError::MalformedEvidence {
                path: path.to_path_buf(),
                message: format!("unsupported evidenceVersion {}", header.evidence_version),
            });
        }
        if header.evidence_kind != "command" {
            return Err(EvidenceError::MalformedEvidence {
                path: path.to_path_buf(),
                message: format!("unexpected evidenceKind {:?}", header.evidence_kind),
            });
        }
        Ok(Self { header, output })
    }

    pub fn render(&self) -> Result<String, EvidenceError> {
        frontmatter::render(&self.header, &self.output).map_err(|e| {
            EvidenceError::MalformedEvidence {
                path: PathBuf::from(Self::file_name(&self.header.command_name)),
                message: e.to_string(),
            }
        })
    }

    /// True when the captured command succeeded.
    pub fn passed(&self) -> bool {
        self.header.exit_code == 0
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
