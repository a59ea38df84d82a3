//! Shared scoring types and the concurrent reasoning-call driver.

use crate::model::Task;
use crate::reasoning::ReasoningError;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;

/// Per-task score, keyed by task id.
pub type ScoreMap = BTreeMap<String, f64>;

/// Skill overlap when either side has nothing to compare.
pub const NEUTRAL_SKILL_OVERLAP: f64 = 0.5;

/// Result of one reasoning-backed scoring phase.
///
/// A phase either scored every candidate or is unavailable as a whole; a
/// timeout is just another `Unavailable`.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseOutcome {
    Scored(ScoreMap),
    Unavailable(String),
}

impl PhaseOutcome {
    pub fn is_scored(&self) -> bool {
        matches!(self, PhaseOutcome::Scored(_))
    }
}

/// Fraction of the task's labels the agent has a matching skill for.
///
/// Comparison is case-insensitive. Returns [`NEUTRAL_SKILL_OVERLAP`] when the
/// task has no labels or the agent has no skills, so missing metadata is
/// neither rewarded nor punished.
pub fn skill_overlap(task: &Task, skills: &BTreeSet<String>) -> f64 {
    if task.labels.is_empty() || skills.is_empty() {
        return NEUTRAL_SKILL_OVERLAP;
    }

    let skills: BTreeSet<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    let matching = task
        .labels
        .iter()
        .filter(|label| skills.contains(&label.to_lowercase()))
        .count();

    matching as f64 / task.labels.len() as f64
}

/// Run `call` for every task concurrently, each bounded by `limit`.
///
/// The first failure, timeout, or panicked worker makes the whole phase
/// unavailable; the remaining in-flight calls are aborted when the join set
/// is dropped. Dropping the returned future aborts them as well.
pub(crate) async fn score_all<F, Fut>(
    phase: &str,
    tasks: &[Task],
    limit: Duration,
    call: F,
) -> PhaseOutcome
where
    F: Fn(Task) -> Fut,
    Fut: Future<Output = Result<f64, ReasoningError>> + Send + 'static,
{
    let mut workers = JoinSet::new();
    for task in tasks {
        let id = task.id.clone();
        let fut = call(task.clone());
        workers.spawn(async move {
            let result = match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(ReasoningError::Timeout(limit.as_millis() as u64)),
            };
            (id, result)
        });
    }

    let mut scores = ScoreMap::new();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((id, Ok(score))) => {
                scores.insert(id, score);
            }
            Ok((id, Err(e))) => {
                return PhaseOutcome::Unavailable(format!("{} for task '{}': {}", phase, id, e));
            }
            Err(e) => {
                return PhaseOutcome::Unavailable(format!("{} worker failed: {}", phase, e));
            }
        }
    }

    PhaseOutcome::Scored(scores)
}
