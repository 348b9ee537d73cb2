// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::scan::fences_balanced;

const SHARED: &str = "Always write a failing test before the implementation so the change is driven by observable behaviour.";

#[test]
fn duplicated_paragraph_survives_only_in_highest_layer() {
    let layers = vec![
        Layer::new("core", format!("{SHARED}\n\nCore-only guidance.\n")),
        Layer::new("pack-p1", format!("{SHARED}\n\nPack-unique paragraph.\n")),
        Layer::new("project", format!("{SHARED}\n\nProject-unique paragraph.\n")),
    ];
    let out = concatenate(&layers, &DedupConfig::default());

    assert_eq!(out.matches("failing test before").count(), 1);
    assert!(out.contains("Core-only guidance."));
    assert!(out.contains("Pack-unique paragraph."));
    assert!(out.contains("Project-unique paragraph."));

    // The surviving copy comes after the pack paragraph: it belongs to the
    // highest-priority layer.
    let shared_pos = out.find("failing test").unwrap();
    let pack_pos = out.find("Pack-unique").unwrap();
    assert!(shared_pos > pack_pos);
}

#[test]
fn short_paragraphs_never_dedup() {
    let layers = vec![
        Layer::new("core", "Be kind.\n"),
        Layer::new("project", "Be kind.\n"),
    ];
    let out = concatenate(&layers, &DedupConfig::default());
    assert_eq!(out.matches("Be kind.").count(), 2);
}

#[test]
fn fenced_blocks_stay_intact() {
    let code = "```sh\nnpm run lint\n\nnpm test\n```";
    let layers = vec![
        Layer::new("core", format!("{SHARED}\n\n{code}\n")),
        Layer::new("project", format!("{SHARED}\n\nProject extra.\n")),
    ];
    let out = concatenate(&layers, &DedupConfig::default());
    assert!(fences_balanced(&out));
    assert!(out.contains("npm run lint"));
    assert!(out.contains("npm test"));
}

#[test]
fn single_layer_passes_through() {
    let layers = vec![Layer::new("core", "Only layer.\n\nSecond paragraph.\n")];
    let out = concatenate(&layers, &DedupConfig::default());
    assert!(out.contains("Only layer."));
    assert!(out.contains("Second paragraph."));
}

#[test]
fn near_duplicate_with_shared_shingle_is_dropped() {
    // Same 12-word prefix, different tail: shares a shingle, so dropped.
    let base = "one two three four five six seven eight nine ten eleven twelve";
    let layers = vec![
        Layer::new("core", format!("{base} extra tail here.\n")),
        Layer::new("project", format!("{base} different ending.\n")),
    ];
    let out = concatenate(&layers, &DedupConfig::default());
    assert!(!out.contains("extra tail here"));
    assert!(out.contains("different ending"));
}

#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Random docs with at least one fenced block always come out with
        /// balanced fences after dedup.
        #[test]
        fn dedup_preserves_fence_balance(
            words in proptest::collection::vec("[a-z]{1,8}", 12..40),
            project_words in proptest::collection::vec("[a-z]{1,8}", 12..40),
        ) {
            let core = format!("{}\n\n```\ncode body\n```\n", words.join(" "));
            let project = project_words.join(" ");
            let out = concatenate(
                &[Layer::new("core", core), Layer::new("project", project)],
                &DedupConfig::default(),
            );
            prop_assert!(fences_balanced(&out));
        }
    }
}
