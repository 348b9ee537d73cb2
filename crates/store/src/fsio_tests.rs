// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn write_atomic_creates_parent_dirs() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("a/b/c.txt");
    write_atomic(&path, b"hello").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
}

#[test]
fn write_atomic_replaces_existing() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("f.txt");
    write_atomic(&path, b"one").unwrap();
    write_atomic(&path, b"two").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
}

#[test]
fn write_atomic_leaves_no_temp_files() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("f.txt");
    write_atomic(&path, b"data").unwrap();
    let names: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["f.txt"]);
}

#[test]
fn read_text_strips_bom() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bom.md");
    std::fs::write(&path, "\u{feff}---\nid: x\n---\nbody").unwrap();
    let text = read_text(&path).unwrap();
    assert!(text.starts_with("---\n"));
}
