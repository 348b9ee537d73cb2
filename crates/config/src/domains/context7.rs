// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context7 domain: package-documentation snapshot requirements.

use crate::value::{bool_or, lookup};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// One tracked package: which files trigger it and what topics to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    #[serde(default)]
    pub library_id: String,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Read-through view of `context7.*`.
#[derive(Debug, Clone, Copy)]
pub struct Context7Config<'a> {
    cfg: &'a Value,
}

impl<'a> Context7Config<'a> {
    pub fn new(cfg: &'a Value) -> Self {
        Self { cfg }
    }

    pub fn enabled(&self) -> bool {
        bool_or(self.cfg, "context7.enabled", false)
    }

    /// Tracked packages keyed by package name.
    pub fn packages(&self) -> BTreeMap<String, PackageSpec> {
        let Some(raw) = lookup(self.cfg, "context7.packages") else {
            return BTreeMap::new();
        };
        serde_yaml::from_value(raw.clone()).unwrap_or_default()
    }

    /// Packages whose trigger globs match any of the given files.
    pub fn triggered_packages(&self, files: &[String]) -> BTreeMap<String, PackageSpec> {
        self.packages()
            .into_iter()
            .filter(|(_, spec)| {
                spec.triggers.iter().any(|t| {
                    files
                        .iter()
                        .any(|f| crate::glob_match::matches(t, f))
                })
            })
            .collect()
    }
}
