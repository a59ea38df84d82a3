//! Config struct definition and default implementation.

use super::types::*;
use crate::model::Agent;
use serde::{Deserialize, Serialize};

/// Configuration for a tack workspace.
///
/// This struct represents the contents of `.tack/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Ranking
    // =========================================================================
    /// Weights and constants for the ranking pipeline.
    pub scoring: ScoringConfig,

    /// Keywords that mark a task as deploy/release-class.
    #[serde(default = "default_safety_keywords")]
    pub safety_keywords: Vec<String>,

    // =========================================================================
    // External reasoning service
    // =========================================================================
    pub reasoning: ReasoningConfig,

    // =========================================================================
    // Agent pool
    // =========================================================================
    /// Agents allowed to request work.
    pub agents: Vec<Agent>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            safety_keywords: default_safety_keywords(),
            reasoning: ReasoningConfig::default(),
            agents: Vec::new(),
        }
    }
}
