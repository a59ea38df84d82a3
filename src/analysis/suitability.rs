//! Suitability scoring through the reasoning service.

use super::scoring::{PhaseOutcome, score_all};
use crate::model::{Agent, Task};
use crate::reasoning::{AgentContext, ReasoningError, ReasoningService, SuitabilityReply};
use std::sync::Arc;
use std::time::Duration;

/// Asks the reasoning service how well each candidate suits an agent.
///
/// Without a service every call reports `Unavailable`, which puts the
/// selector in fallback mode.
#[derive(Clone)]
pub struct SuitabilityScorer {
    service: Option<Arc<dyn ReasoningService>>,
    timeout: Duration,
}

impl SuitabilityScorer {
    pub fn new(service: Option<Arc<dyn ReasoningService>>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Score every candidate as `suitability * confidence`.
    pub async fn score(&self, candidates: &[Task], agent: &Agent) -> PhaseOutcome {
        let Some(service) = &self.service else {
            return PhaseOutcome::Unavailable("reasoning service disabled".to_string());
        };

        let context = AgentContext::from(agent);
        score_all("suitability", candidates, self.timeout, |task| {
            let service = Arc::clone(service);
            let context = context.clone();
            async move {
                let reply = service.score_suitability(&task, &context).await?;
                suitability_value(reply)
            }
        })
        .await
    }
}

/// Validate a reply and combine it into a single score.
pub fn suitability_value(reply: SuitabilityReply) -> Result<f64, ReasoningError> {
    for (name, value) in [
        ("suitabilityScore", reply.suitability_score),
        ("confidenceScore", reply.confidence_score),
    ] {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ReasoningError::Malformed(format!(
                "{} must be within [0, 1] (found {})",
                name, value
            )));
        }
    }

    Ok(reply.suitability_score * reply.confidence_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedReasoning;

    fn reply(suitability: f64, confidence: f64) -> SuitabilityReply {
        SuitabilityReply {
            suitability_score: suitability,
            confidence_score: confidence,
        }
    }

    #[test]
    fn test_value_is_product() {
        assert!((suitability_value(reply(0.8, 0.5)).unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_is_malformed() {
        assert!(matches!(
            suitability_value(reply(1.2, 1.0)),
            Err(ReasoningError::Malformed(_))
        ));
        assert!(suitability_value(reply(0.5, -0.1)).is_err());
        assert!(suitability_value(reply(f64::NAN, 1.0)).is_err());
    }

    #[tokio::test]
    async fn test_disabled_service_is_unavailable() {
        let scorer = SuitabilityScorer::new(None, Duration::from_secs(1));
        let outcome = scorer
            .score(&[Task::new("a", "a")], &Agent::new("agent-1"))
            .await;
        assert!(!outcome.is_scored());
    }

    #[tokio::test]
    async fn test_scores_all_candidates() {
        let service = ScriptedReasoning::new()
            .with_suitability("a", 0.9, 1.0)
            .with_suitability("b", 0.5, 0.5);
        let scorer = SuitabilityScorer::new(Some(Arc::new(service)), Duration::from_secs(1));

        let outcome = scorer
            .score(
                &[Task::new("a", "a"), Task::new("b", "b")],
                &Agent::new("agent-1"),
            )
            .await;

        let PhaseOutcome::Scored(scores) = outcome else {
            panic!("expected scores");
        };
        assert!((scores["a"] - 0.9).abs() < 1e-9);
        assert!((scores["b"] - 0.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_malformed_reply_fails_whole_phase() {
        let service = ScriptedReasoning::new()
            .with_suitability("a", 0.9, 1.0)
            .with_suitability("b", 7.0, 1.0);
        let scorer = SuitabilityScorer::new(Some(Arc::new(service)), Duration::from_secs(1));

        let outcome = scorer
            .score(
                &[Task::new("a", "a"), Task::new("b", "b")],
                &Agent::new("agent-1"),
            )
            .await;
        assert!(matches!(outcome, PhaseOutcome::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let service = ScriptedReasoning::new()
            .with_suitability("a", 0.9, 1.0)
            .with_delay(Duration::from_secs(5));
        let scorer = SuitabilityScorer::new(Some(Arc::new(service)), Duration::from_millis(20));

        let outcome = scorer.score(&[Task::new("a", "a")], &Agent::new("agent-1")).await;
        assert!(matches!(outcome, PhaseOutcome::Unavailable(_)));
    }
}
