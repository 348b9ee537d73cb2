// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task graph views for readiness and planning.
//!
//! The graph is an id-keyed map of lightweight summaries, not object
//! pointers; readiness and planning walk it by id. A scoped view contains
//! global tasks plus (optionally) one session's tasks; tasks from other
//! sessions never participate.

use crate::id::{SessionId, TaskId};
use crate::task::Task;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Lightweight task projection used by graph computations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub id: TaskId,
    pub title: String,
    pub state: String,
    pub session_id: Option<SessionId>,
    pub depends_on: Vec<TaskId>,
    pub related: Vec<TaskId>,
    /// On-disk location, when known (diagnostics only).
    pub path: Option<PathBuf>,
}

impl TaskSummary {
    pub fn from_task(task: &Task, path: Option<PathBuf>) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            state: task.state.clone(),
            session_id: task.session_id.clone(),
            depends_on: task.depends_on.clone(),
            related: task.related.clone(),
            path,
        }
    }
}

/// Id-keyed task graph. BTreeMap keeps iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGraph {
    pub tasks: BTreeMap<TaskId, TaskSummary>,
}

impl TaskGraph {
    pub fn new(tasks: impl IntoIterator<Item = TaskSummary>) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&TaskSummary> {
        self.tasks.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Scoped view: global tasks plus at most one session's tasks.
    ///
    /// With `session_id == None` only global tasks participate. A
    /// session-scoped dependency never satisfies a requirement from the
    /// global tree or from another session.
    pub fn scoped(&self, session_id: Option<&SessionId>) -> TaskGraph {
        let tasks = self
            .tasks
            .values()
            .filter(|t| match (&t.session_id, session_id) {
                (None, _) => true,
                (Some(sid), Some(scope)) => sid == scope,
                (Some(_), None) => false,
            })
            .cloned();
        TaskGraph::new(tasks)
    }

    /// Detect a dependency cycle anywhere in the graph.
    ///
    /// Returns one task id on a cycle, or `None` when acyclic. Missing
    /// dependency targets are ignored here (readiness reports those).
    pub fn find_cycle(&self) -> Option<TaskId> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }
        let mut marks: BTreeMap<&TaskId, Mark> = BTreeMap::new();

        // Iterative DFS with an explicit stack to keep recursion bounded.
        for start in self.tasks.keys() {
            if marks.contains_key(start) {
                continue;
            }
            let mut stack: Vec<(&TaskId, usize)> = vec![(start, 0)];
            marks.insert(start, Mark::InProgress);
            while let Some((id, next_dep)) = stack.pop() {
                let deps = match self.tasks.get(id) {
                    Some(t) => &t.depends_on,
                    None => continue,
                };
                let mut advanced = false;
                for (i, dep) in deps.iter().enumerate().skip(next_dep) {
                    if !self.tasks.contains_key(dep) {
                        continue;
                    }
                    match marks.get(dep) {
                        Some(Mark::InProgress) => return Some(dep.clone()),
                        Some(Mark::Done) => continue,
                        None => {
                            stack.push((id, i + 1));
                            stack.push((dep, 0));
                            marks.insert(dep, Mark::InProgress);
                            advanced = true;
                            break;
                        }
                    }
                }
                if !advanced {
                    marks.insert(id, Mark::Done);
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
