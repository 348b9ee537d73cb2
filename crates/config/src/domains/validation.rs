// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation domain: validators, waves, presets, lint rules.

use crate::error::ConfigError;
use crate::value::{bool_or, lookup, require_str, u64_or};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;

/// Optional web-server lifecycle declared on a validator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebServerSpec {
    pub url: String,
    #[serde(default)]
    pub ensure_running: bool,
    #[serde(default)]
    pub start_command: Option<String>,
    #[serde(default)]
    pub healthcheck_url: Option<String>,
    #[serde(default)]
    pub stop_command: Option<String>,
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_seconds: u64,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

fn default_startup_timeout() -> u64 {
    30
}

fn default_shutdown_timeout() -> u64 {
    10
}

impl WebServerSpec {
    /// The URL probed for reachability (falls back to the server URL).
    pub fn probe_url(&self) -> &str {
        self.healthcheck_url.as_deref().unwrap_or(&self.url)
    }
}

/// One configured validator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub engine: String,
    pub wave: String,
    #[serde(default)]
    pub always_run: bool,
    #[serde(default = "default_blocking")]
    pub blocking: bool,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub focus: Vec<String>,
    #[serde(default)]
    pub web_server: Option<WebServerSpec>,
}

fn default_blocking() -> bool {
    true
}

/// One ordered validation wave.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveSpec {
    pub name: String,
    #[serde(default)]
    pub requires_previous_pass: bool,
    #[serde(default)]
    pub continue_on_fail: bool,
}

/// A named validator selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetSpec {
    #[serde(default)]
    pub validators: Vec<String>,
    #[serde(default)]
    pub blocking_validators: Vec<String>,
    #[serde(default)]
    pub required_evidence: Vec<String>,
}

fn strip_markers(list: &mut Vec<String>) {
    list.retain(|s| s != "+" && s != "=" && s != "-");
}

/// Read-through view of `validation.*`.
#[derive(Debug, Clone, Copy)]
pub struct ValidationConfig<'a> {
    cfg: &'a Value,
}

impl<'a> ValidationConfig<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    /// All validators in declaration order.
    pub fn validators(&self) -> Result<IndexMap<String, ValidatorSpec>, ConfigError> {
        let raw = lookup(self.cfg, "validation.validators").ok_or(ConfigError::MissingKey {
            key: "validation.validators".to_string(),
        })?;
        let mut map: IndexMap<String, ValidatorSpec> =
            serde_yaml::from_value(raw.clone()).map_err(|_| ConfigError::InvalidType {
                key: "validation.validators".to_string(),
                expected: "map of validator specs",
            })?;
        for spec in map.values_mut() {
            strip_markers(&mut spec.triggers);
            strip_markers(&mut spec.focus);
        }
        Ok(map)
    }

    pub fn validator(&self, id: &str) -> Result<ValidatorSpec, ConfigError> {
        self.validators()?
            .shift_remove(id)
            .ok_or_else(|| ConfigError::MissingKey {
                key: format!("validation.validators.{id}"),
            })
    }

    /// Ordered waves.
    pub fn waves(&self) -> Result<Vec<WaveSpec>, ConfigError> {
        let raw = lookup(self.cfg, "validation.waves").ok_or(ConfigError::MissingKey {
            key: "validation.waves".to_string(),
        })?;
        serde_yaml::from_value(raw.clone()).map_err(|_| ConfigError::InvalidType {
            key: "validation.waves".to_string(),
            expected: "list of wave specs",
        })
    }

    pub fn preset(&self, name: &str) -> Result<PresetSpec, ConfigError> {
        let key = format!("validation.presets.{name}");
        let raw = lookup(self.cfg, &key).ok_or(ConfigError::MissingKey { key: key.clone() })?;
        let mut preset: PresetSpec =
            serde_yaml::from_value(raw.clone()).map_err(|_| ConfigError::InvalidType {
                key,
                expected: "preset spec mapping",
            })?;
        strip_markers(&mut preset.validators);
        strip_markers(&mut preset.blocking_validators);
        strip_markers(&mut preset.required_evidence);
        Ok(preset)
    }

    pub fn default_preset(&self) -> Result<String, ConfigError> {
        require_str(self.cfg, "validation.defaultPreset")
    }

    /// Preset used by `session complete` (distinct from the default).
    pub fn session_close_preset(&self) -> Result<String, ConfigError> {
        require_str(self.cfg, "validation.sessionClose.preset")
    }

    pub fn max_workers(&self) -> usize {
        u64_or(self.cfg, "validation.maxWorkers", 4) as usize
    }

    pub fn sequential(&self) -> bool {
        bool_or(self.cfg, "validation.sequential", false)
    }

    /// Config lint: a validator with `triggers: ["*"]` and
    /// `alwaysRun: false` silently degrades to "never runs unless
    /// file-matched" behaviour; reject it.
    pub fn lint(&self) -> Result<(), ConfigError> {
        for (id, spec) in self.validators()? {
            let wildcard = spec.triggers.iter().any(|t| t == "*");
            if wildcard && !spec.always_run {
                return Err(ConfigError::InvalidValidator {
                    validator: id,
                    message: "triggers: [\"*\"] with alwaysRun: false; \
                              set alwaysRun: true or use concrete trigger globs"
                        .to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
