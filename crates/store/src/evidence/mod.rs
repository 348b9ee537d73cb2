// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evidence service: round-based artifact storage per task.
//!
//! Layout: `{management}/qa/validation-evidence/{task_id}/round-{n}/…` with
//! dense, monotonic round numbering starting at 1. One writer per artifact;
//! overwrites go through atomic rename.

pub mod bundle;
pub mod command;
pub mod context7;
pub mod report;

pub use bundle::BundleSummary;
pub use command::{CommandEvidence, CommandHeader};
pub use context7::Context7Marker;
pub use report::{
    Finding, FollowUpTask, ImplementationReport, Tracking, ValidatorReport, Verdict,
};

use crate::error::EvidenceError;
use crate::fsio;
use edison_config::{PathResolver, QaConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One missing/invalid artifact blocking evidence gates, with an
/// actionable fix when a CI command is configured.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceBlocker {
    pub kind: String,
    pub filename: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

/// Round-based evidence storage for tasks.
#[derive(Clone)]
pub struct EvidenceService {
    resolver: PathResolver,
    required_evidence: Vec<String>,
    ci_commands: BTreeMap<String, String>,
}

impl EvidenceService {
    pub fn new(resolver: PathResolver, qa: &QaConfig<'_>) -> Self {
        Self {
            resolver,
            required_evidence: qa.required_evidence(),
            ci_commands: qa.ci_commands(),
        }
    }

    pub fn required_evidence(&self) -> &[String] {
        &self.required_evidence
    }

    pub fn task_dir(&self, task_id: &str) -> PathBuf {
        self.resolver.evidence_dir(task_id)
    }

    pub fn round_dir(&self, task_id: &str, round: u32) -> PathBuf {
        self.task_dir(task_id).join(format!("round-{round}"))
    }

    /// Highest existing round number; 0 when no round exists yet.
    pub fn current_round(&self, task_id: &str) -> u32 {
        let Ok(entries) = std::fs::read_dir(self.task_dir(task_id)) else {
            return 0;
        };
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| {
                e.file_name()
                    .to_string_lossy()
                    .strip_prefix("round-")?
                    .parse::<u32>()
                    .ok()
            })
            .max()
            .unwrap_or(0)
    }

    /// Directory of the highest round; error when no round exists.
    pub fn current_round_dir(&self, task_id: &str) -> Result<PathBuf, EvidenceError> {
        match self.current_round(task_id) {
            0 => Err(EvidenceError::NoRound {
                task_id: task_id.to_string(),
            }),
            n => Ok(self.round_dir(task_id, n)),
        }
    }

    /// Create `round-{n}` (and all lower rounds, keeping numbering dense).
    pub fn ensure_round(&self, task_id: &str, round: u32) -> Result<PathBuf, EvidenceError> {
        let round = round.max(1);
        for n in 1..=round {
            let dir = self.round_dir(task_id, n);
            std::fs::create_dir_all(&dir).map_err(|source| EvidenceError::Io {
                path: dir,
                source,
            })?;
        }
        Ok(self.round_dir(task_id, round))
    }

    /// Open the next round (current + 1).
    pub fn start_next_round(&self, task_id: &str) -> Result<(u32, PathBuf), EvidenceError> {
        let next = self.current_round(task_id) + 1;
        let dir = self.ensure_round(task_id, next)?;
        Ok((next, dir))
    }

    // ----- command evidence -----

    pub fn write_command(
        &self,
        task_id: &str,
        evidence: &CommandEvidence,
    ) -> Result<PathBuf, EvidenceError> {
        let dir = self.ensure_round(task_id, evidence.header.round)?;
        let path = dir.join(CommandEvidence::file_name(&evidence.header.command_name));
        let text = evidence.render()?;
        fsio::write_atomic(&path, text.as_bytes()).map_err(|source| EvidenceError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn read_command(
        &self,
        task_id: &str,
        round: u32,
        command_name: &str,
    ) -> Result<CommandEvidence, EvidenceError> {
        let path = self
            .round_dir(task_id, round)
            .join(CommandEvidence::file_name(command_name));
        let text = read_file(&path)?;
        CommandEvidence::parse(&path, &text)
    }

    // ----- validator reports -----

    pub fn write_validator_report(
        &self,
        report: &ValidatorReport,
    ) -> Result<PathBuf, EvidenceError> {
        let dir = self.ensure_round(&report.task_id, report.round)?;
        let path = dir.join(ValidatorReport::file_name(&report.validator_id));
        write_json(&path, report)?;
        Ok(path)
    }

    /// Strict read of one validator's report; absence or malformation is an
    /// error consumers treat as "not passed".
    pub fn read_validator_report(
        &self,
        task_id: &str,
        round: u32,
        validator_id: &str,
    ) -> Result<ValidatorReport, EvidenceError> {
        let path = self
            .round_dir(task_id, round)
            .join(ValidatorReport::file_name(validator_id));
        read_json(&path)
    }

    /// All parseable validator reports in a round (malformed files are
    /// skipped with a warning; pass/fail checks use the strict reader).
    pub fn list_validator_reports(&self, task_id: &str, round: u32) -> Vec<ValidatorReport> {
        let dir = self.round_dir(task_id, round);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| {
                        let n = n.to_string_lossy();
                        n.starts_with("validator-") && n.ends_with("-report.json")
                    })
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();
        let mut out = Vec::new();
        for path in paths {
            match read_json::<ValidatorReport>(&path) {
                Ok(report) => out.push(report),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping malformed validator report"),
            }
        }
        out
    }

    // ----- implementation report / bundle -----

    pub fn write_implementation_report(
        &self,
        task_id: &str,
        round: u32,
        report: &ImplementationReport,
    ) -> Result<PathBuf, EvidenceError> {
        let dir = self.ensure_round(task_id, round)?;
        let path = dir.join(ImplementationReport::FILE_NAME);
        write_json(&path, report)?;
        Ok(path)
    }

    pub fn read_implementation_report(
        &self,
        task_id: &str,
        round: u32,
    ) -> Result<ImplementationReport, EvidenceError> {
        read_json(&self.round_dir(task_id, round).join(ImplementationReport::FILE_NAME))
    }

    pub fn write_bundle(
        &self,
        task_id: &str,
        bundle: &BundleSummary,
    ) -> Result<PathBuf, EvidenceError> {
        let dir = self.ensure_round(task_id, bundle.round)?;
        let path = dir.join(BundleSummary::FILE_NAME);
        write_json(&path, bundle)?;
        Ok(path)
    }

    pub fn read_bundle(&self, task_id: &str, round: u32) -> Result<BundleSummary, EvidenceError> {
        read_json(&self.round_dir(task_id, round).join(BundleSummary::FILE_NAME))
    }

    // ----- context7 / delegation -----

    pub fn write_context7(
        &self,
        task_id: &str,
        round: u32,
        marker: &Context7Marker,
        docs: &str,
    ) -> Result<PathBuf, EvidenceError> {
        let dir = self.ensure_round(task_id, round)?;
        let path = dir.join(Context7Marker::file_name(&marker.package));
        let text = marker.render(docs)?;
        fsio::write_atomic(&path, text.as_bytes()).map_err(|source| EvidenceError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn list_context7_packages(&self, task_id: &str, round: u32) -> Vec<String> {
        let dir = self.round_dir(task_id, round);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut out: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name.strip_prefix("context7-")
                    .and_then(|rest| rest.strip_suffix(".md").or_else(|| rest.strip_suffix(".txt")))
                    .map(str::to_string)
            })
            .collect();
        out.sort();
        out
    }

    /// Audit trail for `task ready --skip-context7`.
    pub fn write_context7_bypass(
        &self,
        task_id: &str,
        round: u32,
        reason: &str,
        ts: &str,
    ) -> Result<PathBuf, EvidenceError> {
        let dir = self.ensure_round(task_id, round)?;
        let path = dir.join("context7-bypass.json");
        let record = serde_json::json!({
            "taskId": task_id,
            "round": round,
            "reason": reason,
            "bypassedAt": ts,
        });
        write_json(&path, &record)?;
        Ok(path)
    }

    /// Record a planned invocation during orchestrated fan-out.
    pub fn write_delegation(
        &self,
        task_id: &str,
        round: u32,
        validator_id: &str,
        content: &str,
    ) -> Result<PathBuf, EvidenceError> {
        let dir = self.ensure_round(task_id, round)?;
        let path = dir.join(format!("delegation-{validator_id}.md"));
        fsio::write_atomic(&path, content.as_bytes()).map_err(|source| EvidenceError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    // ----- gates -----

    /// Blockers for the configured required evidence in the current round.
    ///
    /// Command evidence must exist, parse strictly, and carry `exitCode 0`;
    /// other required files must simply exist. Fail-closed: with no round
    /// at all, every required artifact is a blocker.
    pub fn missing_evidence_blockers(&self, task_id: &str) -> Vec<EvidenceBlocker> {
        let round = self.current_round(task_id);
        let mut out = Vec::new();
        for filename in &self.required_evidence {
            let command_name =
                CommandEvidence::command_name_of(filename).map(str::to_string);
            let fix = command_name
                .as_deref()
                .and_then(|n| self.ci_commands.get(n).cloned());
            let missing = |message: &str| EvidenceBlocker {
                kind: if command_name.is_some() {
                    "command".to_string()
                } else {
                    "report".to_string()
                },
                filename: filename.clone(),
                message: message.to_string(),
                command_name: command_name.clone(),
                fix: fix.clone(),
            };

            if round == 0 {
                out.push(missing("no evidence round exists"));
                continue;
            }
            let path = self.round_dir(task_id, round).join(filename);
            if !path.is_file() {
                out.push(missing("missing evidence file"));
                continue;
            }
            if command_name.is_some() {
                match read_file(&path).and_then(|text| CommandEvidence::parse(&path, &text)) {
                    Ok(evidence) if !evidence.passed() => {
                        out.push(missing(&format!(
                            "command exited with code {}",
                            evidence.header.exit_code
                        )));
                    }
                    Ok(_) => {}
                    Err(_) => out.push(missing(
                        "missing or malformed YAML frontmatter header (evidence v1 format required)",
                    )),
                }
            }
        }
        out
    }
}

fn read_file(path: &Path) -> Result<String, EvidenceError> {
    fsio::read_text(path).map_err(|source| EvidenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, EvidenceError> {
    let text = read_file(path)?;
    serde_json::from_str(&text).map_err(|source| EvidenceError::MalformedReport {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), EvidenceError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| {
        EvidenceError::MalformedReport {
            path: path.to_path_buf(),
            source,
        }
    })?;
    text.push('\n');
    fsio::write_atomic(path, text.as_bytes()).map_err(|source| EvidenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "evidence_tests.rs"]
mod tests;
