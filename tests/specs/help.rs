// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs.

use crate::prelude::*;

#[test]
fn edison_help_shows_usage() {
    Project::empty()
        .edison()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Usage:"));
}

#[test]
fn edison_version_shows_version() {
    Project::empty()
        .edison()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("0.2"));
}

#[test]
fn session_help_shows_subcommands() {
    Project::empty()
        .edison()
        .args(["session", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("create"))
        .stdout(predicates::str::contains("next"))
        .stdout(predicates::str::contains("complete"));
}

#[test]
fn task_help_shows_subcommands() {
    Project::empty()
        .edison()
        .args(["task", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("create"))
        .stdout(predicates::str::contains("claim"))
        .stdout(predicates::str::contains("ready"));
}

#[test]
fn qa_validate_run_flag_is_a_hard_error() {
    let p = Project::empty();
    p.edison()
        .args(["qa", "validate", "t-1", "--run"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("--execute"));
}
