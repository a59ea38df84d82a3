//! Dependency analysis: critical path and unblock value.
//!
//! The graph has an edge `u -> v` when `v` lists `u` as a dependency. Done
//! tasks are resolved and drop out of the graph, as do references to ids
//! that are not in the backlog.
//!
//! Each task scores
//!
//! ```text
//! BASELINE + CRITICAL_PATH_BONUS (if on the critical path)
//!          + UNBLOCK_WEIGHT * dependents / max_dependents
//! ```
//!
//! which stays in `[0, 1]`.

use super::scoring::ScoreMap;
use crate::model::{Task, TaskStatus};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use tracing::warn;

/// Score of a task with no dependents that is off the critical path.
pub const BASELINE: f64 = 0.0;

/// Added for tasks on the critical path.
pub const CRITICAL_PATH_BONUS: f64 = 0.5;

/// Scaled by the task's share of the largest dependent count.
pub const UNBLOCK_WEIGHT: f64 = 0.5;

/// Output of [`analyze_dependencies`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyAnalysis {
    /// Score for every input task.
    pub scores: ScoreMap,

    /// Longest chain of unresolved dependencies, first task first. Empty when
    /// no open task depends on another.
    pub critical_path: Vec<String>,

    /// Number of open tasks that directly depend on each task.
    pub dependents: BTreeMap<String, usize>,

    /// Tasks on a dependency cycle or downstream of one.
    pub cyclic: BTreeSet<String>,
}

impl DependencyAnalysis {
    pub fn is_on_critical_path(&self, task_id: &str) -> bool {
        self.critical_path.iter().any(|id| id == task_id)
    }

    pub fn dependents_of(&self, task_id: &str) -> usize {
        self.dependents.get(task_id).copied().unwrap_or(0)
    }
}

/// Analyze the dependency graph of `tasks`.
///
/// Runs Kahn's algorithm, popping ready tasks in id order so equally long
/// chains resolve the same way on every call.
pub fn analyze_dependencies(tasks: &[Task]) -> DependencyAnalysis {
    let open: BTreeMap<&str, &Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .map(|t| (t.id.as_str(), t))
        .collect();

    let mut successors: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut indegree: BTreeMap<&str, usize> = open.keys().map(|id| (*id, 0)).collect();
    let mut dependents: BTreeMap<String, usize> = BTreeMap::new();

    for (id, task) in &open {
        for dep in &task.dependencies {
            let Some((dep_id, _)) = open.get_key_value(dep.as_str()) else {
                continue;
            };
            if successors.entry(*dep_id).or_default().insert(*id) {
                *indegree.entry(*id).or_default() += 1;
                *dependents.entry(dep.clone()).or_default() += 1;
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<&str>> = indegree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| Reverse(*id))
        .collect();
    let mut depth: BTreeMap<&str, usize> = BTreeMap::new();
    let mut predecessor: BTreeMap<&str, &str> = BTreeMap::new();
    let mut processed: BTreeSet<&str> = BTreeSet::new();

    while let Some(Reverse(id)) = ready.pop() {
        processed.insert(id);
        let here = depth.get(id).copied().unwrap_or(0);

        for next in successors.get(id).into_iter().flatten() {
            let there = depth.entry(*next).or_insert(0);
            if here + 1 > *there {
                *there = here + 1;
                predecessor.insert(*next, id);
            }

            if let Some(degree) = indegree.get_mut(next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(*next));
                }
            }
        }
    }

    let cyclic: BTreeSet<String> = open
        .keys()
        .filter(|id| !processed.contains(*id))
        .map(|id| id.to_string())
        .collect();
    if !cyclic.is_empty() {
        warn!(
            tasks = ?cyclic,
            "dependency cycle detected; affected tasks get no critical-path bonus"
        );
    }

    let critical_path = longest_chain(&processed, &depth, &predecessor);
    let on_path: BTreeSet<&str> = critical_path.iter().map(String::as_str).collect();
    let max_dependents = dependents.values().copied().max().unwrap_or(0);

    let scores = tasks
        .iter()
        .map(|task| {
            let mut score = BASELINE;
            if on_path.contains(task.id.as_str()) {
                score += CRITICAL_PATH_BONUS;
            }
            if max_dependents > 0 {
                let count = dependents.get(&task.id).copied().unwrap_or(0);
                score += UNBLOCK_WEIGHT * count as f64 / max_dependents as f64;
            }
            (task.id.clone(), score.clamp(0.0, 1.0))
        })
        .collect();

    DependencyAnalysis {
        scores,
        critical_path,
        dependents,
        cyclic,
    }
}

/// Walk back from the deepest processed task. The smallest id wins among
/// equally deep ends.
fn longest_chain(
    processed: &BTreeSet<&str>,
    depth: &BTreeMap<&str, usize>,
    predecessor: &BTreeMap<&str, &str>,
) -> Vec<String> {
    let mut end: Option<(&str, usize)> = None;
    for id in processed {
        let d = depth.get(id).copied().unwrap_or(0);
        if end.is_none_or(|(_, best)| d > best) {
            end = Some((*id, d));
        }
    }

    let Some((mut current, deepest)) = end else {
        return Vec::new();
    };
    if deepest == 0 {
        return Vec::new();
    }

    let mut chain = vec![current.to_string()];
    while let Some(prev) = predecessor.get(current) {
        chain.push(prev.to_string());
        current = *prev;
    }
    chain.reverse();
    chain
}
