// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::SessionId;
use crate::test_support::summary;

#[test]
fn scoped_without_session_drops_session_tasks() {
    let graph = TaskGraph::new([
        summary("g-1", "todo", None, &[]),
        summary("s-1", "todo", Some("sess-a"), &[]),
    ]);
    let scoped = graph.scoped(None);
    assert!(scoped.get("g-1").is_some());
    assert!(scoped.get("s-1").is_none());
}

#[test]
fn scoped_with_session_keeps_global_and_own() {
    let graph = TaskGraph::new([
        summary("g-1", "todo", None, &[]),
        summary("s-1", "todo", Some("sess-a"), &[]),
        summary("s-2", "todo", Some("sess-b"), &[]),
    ]);
    let scoped = graph.scoped(Some(&SessionId::new("sess-a")));
    assert!(scoped.get("g-1").is_some());
    assert!(scoped.get("s-1").is_some());
    assert!(scoped.get("s-2").is_none());
}

#[test]
fn find_cycle_on_acyclic_graph() {
    let graph = TaskGraph::new([
        summary("a", "done", None, &[]),
        summary("b", "todo", None, &["a"]),
        summary("c", "todo", None, &["b"]),
    ]);
    assert_eq!(graph.find_cycle(), None);
}

#[test]
fn find_cycle_detects_two_node_loop() {
    let graph = TaskGraph::new([
        summary("a", "todo", None, &["b"]),
        summary("b", "todo", None, &["a"]),
    ]);
    assert!(graph.find_cycle().is_some());
}

#[test]
fn find_cycle_ignores_missing_deps() {
    let graph = TaskGraph::new([summary("a", "todo", None, &["ghost"])]);
    assert_eq!(graph.find_cycle(), None);
}

#[test]
fn empty_graph_is_empty() {
    assert!(TaskGraph::default().is_empty());
    assert_eq!(TaskGraph::default().find_cycle(), None);
}
