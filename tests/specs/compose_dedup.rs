// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario D: layered guideline composition with shingle dedup.

use crate::prelude::*;
use predicates::prelude::*;

const SHARED: &str = "Always write a failing test before touching the implementation so every change is driven by observable behaviour.";

#[test]
fn duplicated_paragraph_survives_once_from_highest_layer() {
    let p = Project::empty();

    // Core guideline lives in the user layer (low precedence).
    p.file(
        "home/.edison/guidelines/core.md",
        &format!("{SHARED}\n\nCore-only paragraph about commit hygiene and naming.\n\n```sh\nnpm test\n```\n"),
    );
    // Pack carries the same paragraph verbatim plus a unique one.
    p.file(
        ".edison/packs/p1/guidelines/pack.md",
        &format!("{SHARED}\n\nPack-unique paragraph about retry budgets.\n"),
    );
    // Project overlay repeats it again plus its own unique paragraph.
    p.file(
        ".edison/guidelines/project.md",
        &format!("{SHARED}\n\nProject-unique paragraph about deployment windows.\n"),
    );

    p.edison()
        .args(["compose", "all", "--guidelines"])
        .assert()
        .success();

    let out = p.read(".edison/_generated/guidelines.md");
    assert_eq!(
        out.matches("failing test before touching").count(),
        1,
        "shared paragraph must appear exactly once:\n{out}"
    );
    assert!(out.contains("Core-only paragraph"));
    assert!(out.contains("Pack-unique paragraph"));
    assert!(out.contains("Project-unique paragraph"));

    // Survivor comes from the highest-priority (project) layer: it appears
    // after the pack-unique paragraph.
    let shared_pos = out.find("failing test before touching").unwrap();
    let pack_pos = out.find("Pack-unique paragraph").unwrap();
    assert!(shared_pos > pack_pos);

    // Fenced block untouched and balanced.
    assert!(out.contains("npm test"));
    let fence_count = out.lines().filter(|l| l.trim_start().starts_with("```")).count();
    assert_eq!(fence_count % 2, 0, "unbalanced fences:\n{out}");
}

#[test]
fn second_compose_hits_the_cache() {
    let p = Project::empty();
    p.file("home/.edison/guidelines/core.md", "Guideline body here.\n");

    p.edison()
        .args(["compose", "all", "--guidelines"])
        .assert()
        .success();
    p.edison()
        .args(["compose", "all", "--guidelines"])
        .assert()
        .success()
        .stdout(predicates::str::contains("cache hit"));

    // Touching a dependency invalidates deterministically.
    p.file("home/.edison/guidelines/core.md", "Guideline body CHANGED.\n");
    p.edison()
        .args(["compose", "all", "--guidelines"])
        .assert()
        .success()
        .stdout(predicates::str::contains("cache hit").not());
    assert!(p.read(".edison/_generated/guidelines.md").contains("CHANGED"));
}

#[test]
fn includes_expand_during_composition() {
    let p = Project::empty();
    p.file(".edison/guidelines/snippets/tdd.md", "Included TDD guidance.\n");
    p.file(
        ".edison/guidelines/main.md",
        "Top.\n\n{{include:snippets/tdd.md}}\n\nCode example stays: `{{include:snippets/tdd.md}}`\n",
    );
    p.edison()
        .args(["compose", "all", "--guidelines"])
        .assert()
        .success();
    let out = p.read(".edison/_generated/guidelines.md");
    assert!(out.contains("Included TDD guidance."));
    assert!(out.contains("`{{include:snippets/tdd.md}}`"));
}

#[test]
fn config_validate_flags_wildcard_triggers() {
    let p = Project::empty();
    p.file(
        ".edison/config/validation.yml",
        "validation:\n  validators:\n    sloppy:\n      wave: review\n      alwaysRun: false\n      triggers: ['*']\n",
    );
    p.edison()
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("sloppy"))
        .stderr(predicates::str::contains("alwaysRun"));
}
