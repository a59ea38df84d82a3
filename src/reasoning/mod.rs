//! External reasoning service boundary.
//!
//! The service estimates how well a task suits an agent and how much
//! finishing a task now would help the schedule. It is advisory: every call
//! may fail or time out, and the scoring layer turns any failure into the
//! deterministic fallback. Callers impose the timeout; implementations do
//! not need their own.

mod http;

pub use http::HttpReasoningService;

use crate::model::{Agent, Task};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single reasoning call. Never surfaced to assignment callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReasoningError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed reply: {0}")]
    Malformed(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// What the service is told about the requesting agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentContext {
    pub agent_id: String,
    pub role: String,
    pub skills: Vec<String>,
}

impl From<&Agent> for AgentContext {
    fn from(agent: &Agent) -> Self {
        Self {
            agent_id: agent.id.clone(),
            role: agent.role.clone(),
            skills: agent.skills.iter().cloned().collect(),
        }
    }
}

/// What the service is told about the project when predicting impact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    /// Open tasks still in the backlog.
    pub open_tasks: usize,
    /// Open tasks that list the scored task as a dependency.
    pub dependents: usize,
    /// Whether the task is on the current critical path.
    pub on_critical_path: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuitabilityReply {
    pub suitability_score: f64,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReply {
    pub timeline_reduction_days: f64,
    pub risk_reduction: f64,
}

/// An external service that scores tasks.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    async fn score_suitability(
        &self,
        task: &Task,
        agent: &AgentContext,
    ) -> Result<SuitabilityReply, ReasoningError>;

    async fn predict_impact(
        &self,
        task: &Task,
        project: &ProjectContext,
    ) -> Result<ImpactReply, ReasoningError>;
}
