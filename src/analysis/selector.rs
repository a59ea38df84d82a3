//! Combine phase scores into a deterministic ranking.

use super::scoring::{PhaseOutcome, ScoreMap, skill_overlap};
use crate::config::ScoreWeights;
use crate::model::Task;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Which weight set produced a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Both reasoning phases scored every candidate.
    Enriched,
    /// Skill overlap and priority stand in for suitability and impact.
    Fallback,
}

impl std::fmt::Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingMode::Enriched => write!(f, "enriched"),
            RankingMode::Fallback => write!(f, "fallback"),
        }
    }
}

/// One candidate's component scores.
///
/// In fallback mode `suitability` holds the skill overlap and `impact` the
/// priority weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTask {
    pub task_id: String,
    pub combined: f64,
    pub dependency: f64,
    pub suitability: f64,
    pub impact: f64,
    pub skill_overlap: f64,
}

/// Candidates ordered best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub mode: RankingMode,

    /// Why the pass fell back, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,

    pub ranked: Vec<RankedTask>,
}

impl Ranking {
    pub fn best(&self) -> Option<&RankedTask> {
        self.ranked.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    enriched: ScoreWeights,
    fallback: ScoreWeights,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(ScoreWeights::enriched(), ScoreWeights::fallback())
    }
}

impl Selector {
    pub fn new(enriched: ScoreWeights, fallback: ScoreWeights) -> Self {
        Self { enriched, fallback }
    }

    /// Order every candidate.
    ///
    /// The pass is enriched only when both phases scored every candidate;
    /// otherwise the whole pass uses the fallback weights. Ties break on
    /// skill overlap, then task id.
    pub fn rank(
        &self,
        candidates: &[Task],
        dependency: &ScoreMap,
        suitability: &PhaseOutcome,
        impact: &PhaseOutcome,
        skills: &BTreeSet<String>,
    ) -> Ranking {
        let (mode, fallback_reason) = match (suitability, impact) {
            (PhaseOutcome::Scored(s), PhaseOutcome::Scored(i)) => {
                match candidates
                    .iter()
                    .find(|t| !s.contains_key(&t.id) || !i.contains_key(&t.id))
                {
                    Some(missing) => (
                        RankingMode::Fallback,
                        Some(format!("no reasoning score for task '{}'", missing.id)),
                    ),
                    None => (RankingMode::Enriched, None),
                }
            }
            (PhaseOutcome::Unavailable(reason), _) => {
                (RankingMode::Fallback, Some(format!("suitability: {}", reason)))
            }
            (_, PhaseOutcome::Unavailable(reason)) => {
                (RankingMode::Fallback, Some(format!("impact: {}", reason)))
            }
        };

        let weights = match mode {
            RankingMode::Enriched => &self.enriched,
            RankingMode::Fallback => &self.fallback,
        };
        let total = weights.total();

        let mut ranked: Vec<RankedTask> = candidates
            .iter()
            .map(|task| {
                let overlap = skill_overlap(task, skills);
                let dep = dependency.get(&task.id).copied().unwrap_or(0.0);
                let (suit, imp) = match (mode, suitability, impact) {
                    (RankingMode::Enriched, PhaseOutcome::Scored(s), PhaseOutcome::Scored(i)) => (
                        s.get(&task.id).copied().unwrap_or(0.0),
                        i.get(&task.id).copied().unwrap_or(0.0),
                    ),
                    _ => (overlap, task.priority.weight()),
                };

                let combined = (weights.dependency * dep
                    + weights.suitability * suit
                    + weights.impact * imp)
                    / total;

                RankedTask {
                    task_id: task.id.clone(),
                    combined,
                    dependency: dep,
                    suitability: suit,
                    impact: imp,
                    skill_overlap: overlap,
                }
            })
            .collect();

        ranked.sort_by(compare);

        Ranking {
            mode,
            fallback_reason,
            ranked,
        }
    }
}

fn compare(a: &RankedTask, b: &RankedTask) -> Ordering {
    b.combined
        .total_cmp(&a.combined)
        .then_with(|| b.skill_overlap.total_cmp(&a.skill_overlap))
        .then_with(|| a.task_id.cmp(&b.task_id))
}
