// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

struct Fixture {
    tmp: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            tmp: tempfile::tempdir().unwrap(),
        }
    }

    fn cache(&self) -> ComposeCache {
        ComposeCache::new(&self.tmp.path().join("_generated"))
    }

    fn dep(&self, name: &str, content: &str) -> PathBuf {
        let path = self.tmp.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn second_compose_reuses_cache() {
    let f = Fixture::new();
    let cache = f.cache();
    let dep = f.dep("a.md", "alpha");
    let computes = AtomicU32::new(0);

    let compute = || {
        computes.fetch_add(1, Ordering::SeqCst);
        Ok("composed".to_string())
    };
    let (first, hit1) = cache.compose("rules.md", "", &[dep.clone()], compute).unwrap();
    assert!(!hit1);
    assert_eq!(first, "composed");

    let (second, hit2) = cache
        .compose("rules.md", "", &[dep.clone()], || {
            computes.fetch_add(1, Ordering::SeqCst);
            Ok("recomputed".to_string())
        })
        .unwrap();
    assert!(hit2);
    assert_eq!(second, "composed");
    assert_eq!(computes.load(Ordering::SeqCst), 1);
}

#[test]
fn touching_a_dependency_invalidates() {
    let f = Fixture::new();
    let cache = f.cache();
    let dep = f.dep("a.md", "alpha");

    cache
        .compose("out.md", "", &[dep.clone()], || Ok("v1".to_string()))
        .unwrap();
    std::fs::write(&dep, "alpha CHANGED").unwrap();
    let (content, hit) = cache
        .compose("out.md", "", &[dep.clone()], || Ok("v2".to_string()))
        .unwrap();
    assert!(!hit);
    assert_eq!(content, "v2");
}

#[test]
fn extra_keying_participates_in_hash() {
    let f = Fixture::new();
    let cache = f.cache();
    let dep = f.dep("a.md", "alpha");
    cache
        .compose("out.md", "context=qa", &[dep.clone()], || Ok("qa".to_string()))
        .unwrap();
    let (_, hit) = cache
        .compose("out.md", "context=dev", &[dep.clone()], || Ok("dev".to_string()))
        .unwrap();
    assert!(!hit, "different extra keying must recompute");
}

#[test]
fn hash_is_deterministic_and_order_independent() {
    let f = Fixture::new();
    let cache = f.cache();
    let a = f.dep("a.md", "alpha");
    let b = f.dep("b.md", "beta");
    let h1 = cache.hash_dependencies("", &[a.clone(), b.clone()]).unwrap();
    let h2 = cache.hash_dependencies("", &[b, a]).unwrap();
    assert_eq!(h1, h2);
}

#[test]
fn missing_manifest_recomputes_without_error() {
    let f = Fixture::new();
    let cache = f.cache();
    let dep = f.dep("a.md", "alpha");
    cache
        .compose("out.md", "", &[dep.clone()], || Ok("v1".to_string()))
        .unwrap();
    std::fs::remove_file(f.tmp.path().join("_generated/manifest.json")).unwrap();
    let (content, hit) = cache
        .compose("out.md", "", &[dep], || Ok("v2".to_string()))
        .unwrap();
    assert!(!hit);
    assert_eq!(content, "v2");
}
