// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topological wave planning for todo tasks.
//!
//! Unlike [`crate::readiness::ReadinessEvaluator`], the planner does not
//! treat a dependency that is itself a plannable todo task as blocking; it
//! schedules it into an earlier wave. Only dependencies that are missing,
//! unsatisfied and outside the plan set, or transitively blocked mark a task
//! as blocked.

use crate::graph::{TaskGraph, TaskSummary};
use crate::readiness::{BlockedByDependency, ReadinessPolicy};
use std::collections::{BTreeMap, BTreeSet};

/// One parallel batch of schedulable tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWave {
    pub wave: usize,
    pub tasks: Vec<TaskSummary>,
}

/// A todo task excluded from the plan, with diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedTask {
    pub task: TaskSummary,
    pub blocked_by: Vec<BlockedByDependency>,
}

/// Wave plan over the scoped graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPlan {
    pub waves: Vec<TaskWave>,
    pub blocked: Vec<BlockedTask>,
}

/// Compute a topological wave plan for todo tasks.
pub struct TaskPlanner<'a> {
    graph: &'a TaskGraph,
    policy: &'a ReadinessPolicy,
}

impl<'a> TaskPlanner<'a> {
    pub fn new(graph: &'a TaskGraph, policy: &'a ReadinessPolicy) -> Self {
        Self { graph, policy }
    }

    pub fn build_plan(&self) -> TaskPlan {
        let todo: BTreeMap<&str, &TaskSummary> = self
            .graph
            .tasks
            .values()
            .filter(|t| t.state == self.policy.todo_state)
            .map(|t| (t.id.as_str(), t))
            .collect();
        let todo_ids: BTreeSet<&str> = todo.keys().copied().collect();

        // Tasks blocked by dependencies outside the todo plan set.
        let mut blocked_by: BTreeMap<&str, Vec<BlockedByDependency>> = BTreeMap::new();
        for (tid, task) in &todo {
            for dep in &task.depends_on {
                if todo_ids.contains(dep.as_str()) {
                    continue;
                }
                match self.graph.get(dep.as_str()) {
                    None => blocked_by.entry(*tid).or_default().push(BlockedByDependency {
                        dependency_id: dep.to_string(),
                        dependency_state: None,
                        required_states: self.policy.satisfied_states.clone(),
                        reason: "dependency task not found".to_string(),
                        dependency_session_id: None,
                        dependency_path: None,
                    }),
                    Some(d) if !self.policy.satisfied_states.iter().any(|s| s == &d.state) => {
                        blocked_by.entry(*tid).or_default().push(BlockedByDependency {
                            dependency_id: d.id.to_string(),
                            dependency_state: Some(d.state.clone()),
                            required_states: self.policy.satisfied_states.clone(),
                            reason: "dependency not in a satisfied state".to_string(),
                            dependency_session_id: d.session_id.clone(),
                            dependency_path: d.path.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        // Propagate: depending on a blocked todo task blocks you too, since
        // that upstream task cannot be scheduled until its external
        // dependency is resolved.
        let mut blocked_ids: BTreeSet<&str> = blocked_by.keys().copied().collect();
        let mut changed = true;
        while changed {
            changed = false;
            for (tid, task) in &todo {
                if blocked_ids.contains(*tid) {
                    continue;
                }
                for dep in &task.depends_on {
                    if blocked_ids.contains(dep.as_str()) {
                        let dep_state = todo.get(dep.as_str()).map(|t| t.state.clone());
                        blocked_by.entry(*tid).or_default().push(BlockedByDependency {
                            dependency_id: dep.to_string(),
                            dependency_state: dep_state,
                            required_states: self.policy.satisfied_states.clone(),
                            reason: "dependency is externally blocked".to_string(),
                            dependency_session_id: None,
                            dependency_path: None,
                        });
                        blocked_ids.insert(*tid);
                        changed = true;
                        break;
                    }
                }
            }
        }

        let eligible: BTreeSet<&str> = todo_ids.difference(&blocked_ids).copied().collect();

        // Kahn's algorithm over the eligible set.
        let mut dependents: BTreeMap<&str, BTreeSet<&str>> =
            eligible.iter().map(|id| (*id, BTreeSet::new())).collect();
        let mut indegree: BTreeMap<&str, usize> = eligible.iter().map(|id| (*id, 0)).collect();
        for tid in &eligible {
            let Some(task) = todo.get(tid) else { continue };
            for dep in &task.depends_on {
                if let Some(dep_key) = eligible.get(dep.as_str()) {
                    let inserted = dependents.entry(*dep_key).or_default().insert(*tid);
                    if inserted {
                        *indegree.entry(*tid).or_default() += 1;
                    }
                }
            }
        }

        let mut waves = Vec::new();
        let mut remaining: BTreeSet<&str> = eligible.clone();
        let mut wave_no = 1;
        while !remaining.is_empty() {
            let ready: Vec<&str> = remaining
                .iter()
                .filter(|id| indegree.get(**id).copied().unwrap_or(0) == 0)
                .copied()
                .collect();
            if ready.is_empty() {
                // Cycle inside the eligible set: fail closed by emitting no
                // further waves.
                break;
            }
            let ordered = order_wave(&ready, &todo);
            let tasks: Vec<TaskSummary> = ordered
                .iter()
                .filter_map(|id| todo.get(id.as_str()).map(|t| (*t).clone()))
                .collect();
            waves.push(TaskWave {
                wave: wave_no,
                tasks,
            });
            wave_no += 1;
            for id in ready {
                remaining.remove(id);
                if let Some(children) = dependents.get(id) {
                    for child in children.clone() {
                        if let Some(d) = indegree.get_mut(child) {
                            *d = d.saturating_sub(1);
                        }
                    }
                }
            }
        }

        let blocked = blocked_ids
            .iter()
            .filter_map(|tid| {
                todo.get(tid).map(|t| BlockedTask {
                    task: (*t).clone(),
                    blocked_by: blocked_by.get(tid).cloned().unwrap_or_default(),
                })
            })
            .collect();

        TaskPlan { waves, blocked }
    }
}

fn find_root(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Order a wave's tasks, preferring related clusters.
///
/// Union-find over declared `related` ids restricted to the wave set, using
/// integer indices rather than id references. Deterministic: larger clusters
/// first, ties by smallest task id, members sorted by id.
fn order_wave(ready: &[&str], todo: &BTreeMap<&str, &TaskSummary>) -> Vec<String> {
    if ready.len() <= 1 {
        return ready.iter().map(|s| s.to_string()).collect();
    }
    let index: BTreeMap<&str, usize> = ready.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut parent: Vec<usize> = (0..ready.len()).collect();

    for (i, id) in ready.iter().enumerate() {
        let Some(task) = todo.get(id) else { continue };
        for other in &task.related {
            if let Some(&j) = index.get(other.as_str()) {
                let (ra, rb) = (find_root(&mut parent, i), find_root(&mut parent, j));
                if ra != rb {
                    // Deterministic union: smaller root id wins.
                    let (lo, hi) = if ready[ra] < ready[rb] { (ra, rb) } else { (rb, ra) };
                    parent[hi] = lo;
                }
            }
        }
    }

    let mut components: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (i, id) in ready.iter().enumerate() {
        let root = find_root(&mut parent, i);
        components.entry(root).or_default().push(id);
    }

    let mut clusters: Vec<Vec<&str>> = components.into_values().collect();
    for c in &mut clusters {
        c.sort_unstable();
    }
    clusters.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(b[0])));

    clusters
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
