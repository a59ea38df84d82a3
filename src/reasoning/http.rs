//! HTTP client for the reasoning service.
//!
//! Posts JSON to `{endpoint}/suitability` and `{endpoint}/impact` with a
//! bearer token and expects the camelCase replies defined in the parent
//! module.

use super::{
    AgentContext, ImpactReply, ProjectContext, ReasoningError, ReasoningService,
    SuitabilityReply,
};
use crate::model::Task;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskPayload<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    labels: Vec<&'a str>,
    priority: String,
    estimated_hours: f64,
}

impl<'a> From<&'a Task> for TaskPayload<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: &task.id,
            name: &task.name,
            description: &task.description,
            labels: task.labels.iter().map(String::as_str).collect(),
            priority: task.priority.to_string(),
            estimated_hours: task.estimated_hours,
        }
    }
}

#[derive(Serialize)]
struct SuitabilityRequest<'a> {
    task: TaskPayload<'a>,
    agent: &'a AgentContext,
}

#[derive(Serialize)]
struct ImpactRequest<'a> {
    task: TaskPayload<'a>,
    project: &'a ProjectContext,
}

/// Reasoning service reached over HTTP.
pub struct HttpReasoningService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpReasoningService {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn post<Req: Serialize, Res: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Req,
    ) -> Result<Res, ReasoningError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ReasoningError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ReasoningError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ReasoningError::Malformed(e.to_string()))
    }
}

impl std::fmt::Debug for HttpReasoningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReasoningService")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl ReasoningService for HttpReasoningService {
    async fn score_suitability(
        &self,
        task: &Task,
        agent: &AgentContext,
    ) -> Result<SuitabilityReply, ReasoningError> {
        let request = SuitabilityRequest {
            task: task.into(),
            agent,
        };
        self.post("suitability", &request).await
    }

    async fn predict_impact(
        &self,
        task: &Task,
        project: &ProjectContext,
    ) -> Result<ImpactReply, ReasoningError> {
        let request = ImpactRequest {
            task: task.into(),
            project,
        };
        self.post("impact", &request).await
    }
}
