//! Impact prediction through the reasoning service.

use super::dependency::DependencyAnalysis;
use super::scoring::{PhaseOutcome, score_all};
use crate::model::Task;
use crate::reasoning::{ImpactReply, ProjectContext, ReasoningError, ReasoningService};
use std::sync::Arc;
use std::time::Duration;

/// Asks the reasoning service how much finishing each candidate now would
/// shorten the schedule or reduce risk.
#[derive(Clone)]
pub struct ImpactPredictor {
    service: Option<Arc<dyn ReasoningService>>,
    timeout: Duration,
    timeline_scale_days: f64,
}

impl ImpactPredictor {
    pub fn new(
        service: Option<Arc<dyn ReasoningService>>,
        timeout: Duration,
        timeline_scale_days: f64,
    ) -> Self {
        Self {
            service,
            timeout,
            timeline_scale_days,
        }
    }

    /// Predict a normalized impact score for every candidate.
    ///
    /// `open_tasks` is the number of open tasks in the backlog, passed to the
    /// service as project context together with each task's graph position.
    pub async fn predict(
        &self,
        candidates: &[Task],
        dependencies: &DependencyAnalysis,
        open_tasks: usize,
    ) -> PhaseOutcome {
        let Some(service) = &self.service else {
            return PhaseOutcome::Unavailable("reasoning service disabled".to_string());
        };

        let scale = self.timeline_scale_days;
        score_all("impact", candidates, self.timeout, |task| {
            let service = Arc::clone(service);
            let project = ProjectContext {
                open_tasks,
                dependents: dependencies.dependents_of(&task.id),
                on_critical_path: dependencies.is_on_critical_path(&task.id),
            };
            async move {
                let reply = service.predict_impact(&task, &project).await?;
                normalize_impact(reply, scale)
            }
        })
        .await
    }
}

/// Fold a reply into `[0, 1]`.
///
/// Days are clamped to `[0, scale]` and scaled down, risk is clamped to
/// `[0, 1]`, and the sum is clamped again. Out-of-range numbers are clamped;
/// only non-finite ones are rejected.
pub fn normalize_impact(reply: ImpactReply, scale: f64) -> Result<f64, ReasoningError> {
    if !reply.timeline_reduction_days.is_finite() || !reply.risk_reduction.is_finite() {
        return Err(ReasoningError::Malformed(format!(
            "non-finite impact values (days {}, risk {})",
            reply.timeline_reduction_days, reply.risk_reduction
        )));
    }

    let days = reply.timeline_reduction_days.clamp(0.0, scale) / scale;
    let risk = reply.risk_reduction.clamp(0.0, 1.0);
    Ok((days + risk).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dependency::analyze_dependencies;
    use crate::config::types::TIMELINE_SCALE_DAYS;
    use crate::test_support::ScriptedReasoning;

    fn reply(days: f64, risk: f64) -> ImpactReply {
        ImpactReply {
            timeline_reduction_days: days,
            risk_reduction: risk,
        }
    }

    #[test]
    fn test_normalization() {
        let k = TIMELINE_SCALE_DAYS;
        assert_eq!(normalize_impact(reply(0.0, 0.0), k).unwrap(), 0.0);
        assert!((normalize_impact(reply(15.0, 0.0), k).unwrap() - 0.5).abs() < 1e-9);
        assert!((normalize_impact(reply(3.0, 0.2), k).unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(normalize_impact(reply(30.0, 1.0), k).unwrap(), 1.0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let k = TIMELINE_SCALE_DAYS;
        assert_eq!(normalize_impact(reply(-10.0, -3.0), k).unwrap(), 0.0);
        assert_eq!(normalize_impact(reply(1e9, 0.0), k).unwrap(), 1.0);
        assert_eq!(normalize_impact(reply(0.0, 42.0), k).unwrap(), 1.0);
    }

    #[test]
    fn test_nan_is_malformed() {
        assert!(normalize_impact(reply(f64::NAN, 0.5), 30.0).is_err());
        assert!(normalize_impact(reply(1.0, f64::INFINITY), 30.0).is_err());
    }

    #[tokio::test]
    async fn test_predict_passes_graph_context() {
        let tasks = vec![Task::new("a", "a"), Task::new("b", "b").with_dependencies(["a"])];
        let analysis = analyze_dependencies(&tasks);
        let service = Arc::new(
            ScriptedReasoning::new()
                .with_impact("a", 6.0, 0.0)
                .with_impact("b", 0.0, 0.1),
        );
        let predictor = ImpactPredictor::new(
            Some(service.clone()),
            Duration::from_secs(1),
            TIMELINE_SCALE_DAYS,
        );

        let outcome = predictor.predict(&tasks, &analysis, 2).await;

        let PhaseOutcome::Scored(scores) = outcome else {
            panic!("expected scores");
        };
        assert!((scores["a"] - 0.2).abs() < 1e-9);
        assert!((scores["b"] - 0.1).abs() < 1e-9);

        let seen = service.impact_contexts();
        let a = seen.iter().find(|(id, _)| id == "a").unwrap();
        assert_eq!(a.1.dependents, 1);
        assert!(a.1.on_critical_path);
        assert_eq!(a.1.open_tasks, 2);
    }

    #[tokio::test]
    async fn test_service_error_is_unavailable() {
        let service = ScriptedReasoning::new().failing();
        let predictor = ImpactPredictor::new(
            Some(Arc::new(service)),
            Duration::from_secs(1),
            TIMELINE_SCALE_DAYS,
        );

        let tasks = vec![Task::new("a", "a")];
        let outcome = predictor
            .predict(&tasks, &analyze_dependencies(&tasks), 1)
            .await;
        assert!(matches!(outcome, PhaseOutcome::Unavailable(_)));
    }
}
