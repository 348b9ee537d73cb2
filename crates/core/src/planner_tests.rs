// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{policy, summary, summary_related};

fn wave_ids(plan: &TaskPlan, n: usize) -> Vec<String> {
    plan.waves[n].tasks.iter().map(|t| t.id.to_string()).collect()
}

#[test]
fn chain_schedules_into_consecutive_waves() {
    // A done; B <- A; C <- B; D <- A + missing dep.
    let graph = TaskGraph::new([
        summary("a", "done", None, &[]),
        summary("b", "todo", None, &["a"]),
        summary("c", "todo", None, &["b"]),
        summary("d", "todo", None, &["a", "z-missing"]),
    ]);
    let policy = policy();
    let plan = TaskPlanner::new(&graph, &policy).build_plan();

    assert_eq!(plan.waves.len(), 2);
    assert_eq!(wave_ids(&plan, 0), vec!["b"]);
    assert_eq!(wave_ids(&plan, 1), vec!["c"]);

    assert_eq!(plan.blocked.len(), 1);
    assert_eq!(plan.blocked[0].task.id, "d");
    assert_eq!(
        plan.blocked[0].blocked_by[0].reason,
        "dependency task not found"
    );
}

#[test]
fn blocked_status_propagates_to_dependents() {
    let graph = TaskGraph::new([
        summary("stuck", "todo", None, &["missing"]),
        summary("downstream", "todo", None, &["stuck"]),
    ]);
    let policy = policy();
    let plan = TaskPlanner::new(&graph, &policy).build_plan();

    assert!(plan.waves.is_empty());
    let ids: Vec<_> = plan.blocked.iter().map(|b| b.task.id.to_string()).collect();
    assert_eq!(ids, vec!["downstream", "stuck"]);
    let downstream = &plan.blocked[0];
    assert_eq!(
        downstream.blocked_by[0].reason,
        "dependency is externally blocked"
    );
}

#[test]
fn independent_tasks_share_wave_one() {
    let graph = TaskGraph::new([
        summary("a", "todo", None, &[]),
        summary("b", "todo", None, &[]),
    ]);
    let policy = policy();
    let plan = TaskPlanner::new(&graph, &policy).build_plan();
    assert_eq!(plan.waves.len(), 1);
    assert_eq!(wave_ids(&plan, 0), vec!["a", "b"]);
}

#[test]
fn related_cluster_orders_first_within_wave() {
    // d+b form a related cluster; clusters beat singletons, members sorted.
    let graph = TaskGraph::new([
        summary_related("a", "todo", &[], &[]),
        summary_related("b", "todo", &[], &["d"]),
        summary_related("d", "todo", &[], &["b"]),
    ]);
    let policy = policy();
    let plan = TaskPlanner::new(&graph, &policy).build_plan();
    assert_eq!(wave_ids(&plan, 0), vec!["b", "d", "a"]);
}

#[test]
fn cycle_in_eligible_set_emits_no_waves() {
    let graph = TaskGraph::new([
        summary("a", "todo", None, &["b"]),
        summary("b", "todo", None, &["a"]),
    ]);
    let policy = policy();
    let plan = TaskPlanner::new(&graph, &policy).build_plan();
    assert!(plan.waves.is_empty());
    // Cycle members are not reported blocked either: fail-closed silence.
    assert!(plan.blocked.is_empty());
}

#[test]
fn diamond_dependency_plan() {
    let graph = TaskGraph::new([
        summary("root", "todo", None, &[]),
        summary("left", "todo", None, &["root"]),
        summary("right", "todo", None, &["root"]),
        summary("join", "todo", None, &["left", "right"]),
    ]);
    let policy = policy();
    let plan = TaskPlanner::new(&graph, &policy).build_plan();
    assert_eq!(plan.waves.len(), 3);
    assert_eq!(wave_ids(&plan, 0), vec!["root"]);
    assert_eq!(wave_ids(&plan, 1), vec!["left", "right"]);
    assert_eq!(wave_ids(&plan, 2), vec!["join"]);
}
