//! Ranking pipeline: safety filter, dependency analysis, suitability and
//! impact scoring, and selection.
//!
//! Everything here works on a per-request snapshot of the backlog and never
//! touches shared state, so concurrent requests each run their own pass.

pub mod dependency;
pub mod impact;
pub mod safety;
pub mod scoring;
pub mod selector;
pub mod suitability;

pub use dependency::{DependencyAnalysis, analyze_dependencies};
pub use impact::ImpactPredictor;
pub use safety::{Exclusion, SafetyFilter, SafetyReport};
pub use scoring::{PhaseOutcome, ScoreMap, skill_overlap};
pub use selector::{RankedTask, Ranking, RankingMode, Selector};
pub use suitability::SuitabilityScorer;
