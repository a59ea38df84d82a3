//! Configuration types and defaults for tack.
//!
//! The scoring constants here are tunable defaults, not a contract. They are
//! named so that a ranking can always be traced back to the numbers behind it.

use serde::{Deserialize, Serialize};

/// Dependency weight when the reasoning service enriched the ranking.
pub const ENRICHED_DEPENDENCY_WEIGHT: f64 = 0.3;
/// Suitability weight when the reasoning service enriched the ranking.
pub const ENRICHED_SUITABILITY_WEIGHT: f64 = 0.4;
/// Impact weight when the reasoning service enriched the ranking.
pub const ENRICHED_IMPACT_WEIGHT: f64 = 0.3;

/// Dependency weight for the deterministic fallback ranking.
pub const FALLBACK_DEPENDENCY_WEIGHT: f64 = 0.3;
/// Skill-match weight for the deterministic fallback ranking.
pub const FALLBACK_SKILL_WEIGHT: f64 = 0.4;
/// Priority weight for the deterministic fallback ranking.
pub const FALLBACK_PRIORITY_WEIGHT: f64 = 0.3;

/// Timeline reduction (in days) treated as a maximal impact.
pub const TIMELINE_SCALE_DAYS: f64 = 30.0;

/// Per-call timeout for the reasoning service.
pub const DEFAULT_REASONING_TIMEOUT_MS: u64 = 5_000;

/// Weights of the three ranking signals.
///
/// The first slot is always the dependency score. The other two are
/// suitability/impact in enriched mode and skill-match/priority in
/// fallback mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub dependency: f64,
    pub suitability: f64,
    pub impact: f64,
}

impl ScoreWeights {
    pub fn enriched() -> Self {
        Self {
            dependency: ENRICHED_DEPENDENCY_WEIGHT,
            suitability: ENRICHED_SUITABILITY_WEIGHT,
            impact: ENRICHED_IMPACT_WEIGHT,
        }
    }

    pub fn fallback() -> Self {
        Self {
            dependency: FALLBACK_DEPENDENCY_WEIGHT,
            suitability: FALLBACK_SKILL_WEIGHT,
            impact: FALLBACK_PRIORITY_WEIGHT,
        }
    }

    pub fn total(&self) -> f64 {
        self.dependency + self.suitability + self.impact
    }
}

/// Scoring section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weights used when suitability and impact both came from the reasoning service.
    pub enriched: ScoreWeights,
    /// Weights used for the deterministic fallback.
    pub fallback: ScoreWeights,
    /// Scale constant K for impact normalization.
    pub timeline_scale_days: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enriched: ScoreWeights::enriched(),
            fallback: ScoreWeights::fallback(),
            timeline_scale_days: TIMELINE_SCALE_DAYS,
        }
    }
}

/// External reasoning service section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// When false the engine never calls out and always ranks deterministically.
    pub enabled: bool,
    /// Base URL of the reasoning service.
    pub endpoint: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            api_key_env: default_api_key_env(),
            timeout_ms: DEFAULT_REASONING_TIMEOUT_MS,
        }
    }
}

/// Keywords marking deploy/release-class tasks.
pub fn default_safety_keywords() -> Vec<String> {
    [
        "deploy",
        "deployment",
        "release",
        "production",
        "prod",
        "launch",
        "rollout",
        "publish",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub(crate) fn default_api_key_env() -> String {
    "TACK_REASONING_API_KEY".to_string()
}
