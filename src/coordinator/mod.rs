//! The assignment coordinator.
//!
//! Hands each requesting agent at most one task and never gives the same
//! task to two agents.
//!
//! # Request phases
//!
//! 1. Under the ledger lock: reject unknown agents, return an agent's live
//!    assignment as-is, refuse a second concurrent request for one agent.
//! 2. Snapshot the backlog; candidates are Todo tasks nobody holds or has
//!    reserved.
//! 3. Without the lock: safety filter, dependency analysis, reasoning calls,
//!    ranking. Every request runs its own pass.
//! 4. Under the lock: reserve the best candidate still free.
//! 5. Durable write: assignment record, then the backlog status. A failed
//!    status write revokes the record.
//!
//! The lock is a plain mutex held for map lookups only. Phase 5 has no await
//! points, so a caller that drops the request future can only do so during
//! phase 3, and the request guard then clears its claim.

mod ledger;

use crate::analysis::{
    Exclusion, ImpactPredictor, PhaseOutcome, RankedTask, Ranking, RankingMode, SafetyFilter,
    Selector, SuitabilityScorer, analyze_dependencies,
};
use crate::backlog::Backlog;
use crate::config::Config;
use crate::error::{Result, TackError};
use crate::events::{Event, EventAction, EventLog};
use crate::model::{Agent, AgentStatus, Assignment, Task};
use crate::reasoning::ReasoningService;
use crate::store::AssignmentStore;
use ledger::{Ledger, RequestGuard, SharedLedger};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of [`Coordinator::request_assignment`].
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentOutcome {
    /// A new task was assigned.
    Assigned(Assignment),
    /// The agent already holds this assignment and must release it first.
    Existing(Assignment),
    /// Nothing suitable is free right now.
    NoTaskAvailable,
}

impl AssignmentOutcome {
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            AssignmentOutcome::Assigned(a) | AssignmentOutcome::Existing(a) => Some(a),
            AssignmentOutcome::NoTaskAvailable => None,
        }
    }
}

/// What an agent reports when it stops working a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Blocked { reason: String },
    /// Hand the task back without changing its backlog status.
    Released,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed => write!(f, "completed"),
            Outcome::Blocked { .. } => write!(f, "blocked"),
            Outcome::Released => write!(f, "released"),
        }
    }
}

/// Result of [`Coordinator::report_outcome`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    Released(Assignment),
    /// The agent did not hold that task. Nothing changed.
    NotAssigned,
}

/// A dry-run ranking for one agent.
#[derive(Debug, Clone)]
pub struct Preview {
    pub ranking: Ranking,
    /// Candidates the safety filter held back.
    pub excluded: Vec<Exclusion>,
}

pub struct Coordinator {
    agents: BTreeMap<String, Agent>,
    backlog: Arc<dyn Backlog>,
    store: Arc<dyn AssignmentStore>,
    events: Option<EventLog>,
    reasoning_enabled: bool,
    safety: SafetyFilter,
    suitability: SuitabilityScorer,
    impact: ImpactPredictor,
    selector: Selector,
    ledger: SharedLedger,
}

impl Coordinator {
    /// Build a coordinator and load every persisted assignment.
    ///
    /// `reasoning` is `None` when the reasoning service is disabled; every
    /// ranking then uses the fallback weights.
    pub fn open(
        config: &Config,
        backlog: Arc<dyn Backlog>,
        store: Arc<dyn AssignmentStore>,
        reasoning: Option<Arc<dyn ReasoningService>>,
    ) -> Result<Self> {
        config.validate()?;

        let safety = SafetyFilter::new(&config.safety_keywords)?;
        let timeout = Duration::from_millis(config.reasoning.timeout_ms);
        let agents: BTreeMap<String, Agent> = config
            .agents
            .iter()
            .map(|a| (a.id.clone(), a.clone()))
            .collect();

        let records = store.load_all()?;
        for record in &records {
            if !agents.contains_key(&record.agent_id) {
                warn!(
                    agent = %record.agent_id,
                    task = %record.task_id,
                    "restored assignment belongs to an agent missing from config"
                );
            }
        }
        info!(restored = records.len(), agents = agents.len(), "coordinator ready");
        let ledger = Ledger::restore(records)?;

        Ok(Self {
            agents,
            backlog,
            store,
            events: None,
            reasoning_enabled: reasoning.is_some(),
            safety,
            suitability: SuitabilityScorer::new(reasoning.clone(), timeout),
            impact: ImpactPredictor::new(reasoning, timeout, config.scoring.timeline_scale_days),
            selector: Selector::new(config.scoring.enriched, config.scoring.fallback),
            ledger: SharedLedger::new(ledger),
        })
    }

    /// Append assign, release, and rollback events to `log`.
    pub fn with_event_log(mut self, log: EventLog) -> Self {
        self.events = Some(log);
        self
    }

    /// Assign the best free task to `agent_id`.
    pub async fn request_assignment(&self, agent_id: &str) -> Result<AssignmentOutcome> {
        let agent = self.require_agent(agent_id)?;

        // ====================================================================
        // Phase 1: Register the request
        // ====================================================================

        let mut request = {
            let mut ledger = self.ledger.lock();
            if let Some(existing) = ledger.assignment_for(agent_id) {
                debug!(agent = agent_id, task = %existing.task_id, "agent already holds a task");
                return Ok(AssignmentOutcome::Existing(existing.clone()));
            }
            self.ledger.begin_request(&mut ledger, agent_id)?
        };

        // ====================================================================
        // Phase 2-3: Snapshot and rank outside the lock
        // ====================================================================

        let tasks = self.backlog.list_tasks()?;
        let taken = self.ledger.lock().taken();
        let preview = self.rank_candidates(agent, &tasks, &taken).await;

        // ====================================================================
        // Phase 4: Reserve the best candidate still free
        // ====================================================================

        let chosen = {
            let mut ledger = self.ledger.lock();
            let pick = preview
                .ranking
                .ranked
                .iter()
                .find(|r| !ledger.is_taken(&r.task_id))
                .cloned();
            if let Some(pick) = &pick {
                request.reserve(&mut ledger, &pick.task_id);
            }
            pick
        };

        let Some(chosen) = chosen else {
            info!(
                agent = agent_id,
                ranked = preview.ranking.ranked.len(),
                excluded = preview.excluded.len(),
                "no task available"
            );
            return Ok(AssignmentOutcome::NoTaskAvailable);
        };

        // ====================================================================
        // Phase 5: Durable write
        // ====================================================================

        let Some(task) = tasks.iter().find(|t| t.id == chosen.task_id) else {
            return Err(TackError::Integrity {
                task_id: chosen.task_id,
                cause: "ranked task missing from backlog snapshot".to_string(),
            });
        };

        self.commit(&mut request, agent_id, task, &preview.ranking, &chosen)
            .map(AssignmentOutcome::Assigned)
    }

    /// Rank the free candidates for `agent_id` without reserving anything.
    pub async fn preview(&self, agent_id: &str) -> Result<Preview> {
        let agent = self.require_agent(agent_id)?;
        let tasks = self.backlog.list_tasks()?;
        let taken = self.ledger.lock().taken();
        Ok(self.rank_candidates(agent, &tasks, &taken).await)
    }

    /// Apply an agent's outcome to the backlog and release its assignment.
    ///
    /// Reporting for a task the agent does not hold is a no-op, so repeating
    /// a report is safe.
    pub fn report_outcome(
        &self,
        agent_id: &str,
        task_id: &str,
        outcome: Outcome,
    ) -> Result<ReleaseOutcome> {
        let _request = {
            let mut ledger = self.ledger.lock();
            match ledger.assignment_for(agent_id) {
                Some(current) if current.task_id == task_id => {}
                _ => {
                    debug!(agent = agent_id, task = task_id, "nothing to release");
                    return Ok(ReleaseOutcome::NotAssigned);
                }
            }
            self.ledger.begin_request(&mut ledger, agent_id)?
        };

        match &outcome {
            Outcome::Completed => self.backlog.mark_task_done(task_id)?,
            Outcome::Blocked { reason } => self.backlog.mark_task_blocked(task_id, reason)?,
            Outcome::Released => {}
        }

        self.store.remove(agent_id)?;
        let released = self.ledger.lock().release(agent_id, task_id);
        let Some(assignment) = released else {
            return Ok(ReleaseOutcome::NotAssigned);
        };

        info!(agent = agent_id, task = task_id, %outcome, "assignment released");
        let mut details = json!({ "outcome": outcome.to_string() });
        if let Outcome::Blocked { reason } = &outcome {
            details["reason"] = json!(reason);
        }
        self.record(
            Event::new(EventAction::Release)
                .with_agent(agent_id)
                .with_task(task_id)
                .with_details(details),
        );

        Ok(ReleaseOutcome::Released(assignment))
    }

    /// Release an assignment without changing the task's backlog status.
    pub fn release_assignment(&self, agent_id: &str, task_id: &str) -> Result<ReleaseOutcome> {
        self.report_outcome(agent_id, task_id, Outcome::Released)
    }

    /// Live assignments, ordered by agent id.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.ledger.lock().assignments().cloned().collect()
    }

    /// A configured agent with its current task filled in.
    pub fn agent(&self, agent_id: &str) -> Option<Agent> {
        let mut agent = self.agents.get(agent_id)?.clone();
        let current = self
            .ledger
            .lock()
            .current_task(agent_id)
            .map(str::to_string);
        agent.status = if current.is_some() {
            AgentStatus::Working
        } else {
            AgentStatus::Available
        };
        agent.current_task_id = current;
        Some(agent)
    }

    /// Every configured agent, ordered by id.
    pub fn agents(&self) -> Vec<Agent> {
        self.agents
            .keys()
            .filter_map(|id| self.agent(id))
            .collect()
    }

    fn require_agent(&self, agent_id: &str) -> Result<&Agent> {
        self.agents.get(agent_id).ok_or_else(|| {
            TackError::UserError(format!(
                "unknown agent '{}'.\n\n\
                 Agents are declared under `agents:` in .tack/config.yaml.",
                agent_id
            ))
        })
    }

    async fn rank_candidates(
        &self,
        agent: &Agent,
        tasks: &[Task],
        taken: &BTreeSet<String>,
    ) -> Preview {
        let candidates: Vec<Task> = tasks
            .iter()
            .filter(|t| t.is_open() && !taken.contains(&t.id))
            .cloned()
            .collect();

        let report = self.safety.apply(candidates, tasks);
        let dependencies = analyze_dependencies(tasks);

        let suitability = self.suitability.score(&report.allowed, agent).await;
        let impact = if suitability.is_scored() {
            let open_tasks = tasks.iter().filter(|t| t.is_open()).count();
            self.impact
                .predict(&report.allowed, &dependencies, open_tasks)
                .await
        } else {
            PhaseOutcome::Unavailable("skipped".to_string())
        };

        let ranking = self.selector.rank(
            &report.allowed,
            &dependencies.scores,
            &suitability,
            &impact,
            &agent.skills,
        );

        if ranking.mode == RankingMode::Fallback {
            let reason = ranking.fallback_reason.as_deref().unwrap_or_default();
            if self.reasoning_enabled {
                warn!(agent = %agent.id, reason, "reasoning unavailable, ranking in fallback mode");
            } else {
                debug!(agent = %agent.id, "ranking in fallback mode");
            }
        }

        Preview {
            ranking,
            excluded: report.excluded,
        }
    }

    /// Persist a reserved task. Nothing in here awaits.
    fn commit(
        &self,
        request: &mut RequestGuard,
        agent_id: &str,
        task: &Task,
        ranking: &Ranking,
        chosen: &RankedTask,
    ) -> Result<Assignment> {
        let assignment = Assignment::new(agent_id, task);

        if let Err(e) = self.store.save(&assignment) {
            return Err(self.rolled_back(agent_id, &task.id, e));
        }

        if let Err(e) = self.backlog.mark_task_in_progress(&task.id, agent_id) {
            if let Err(revoke) = self.store.remove(agent_id) {
                // The record is still durable, so the ledger must keep it too.
                error!(
                    agent = agent_id,
                    task = %task.id,
                    error = %revoke,
                    "could not revoke assignment record after backlog failure"
                );
                request.commit(assignment);
                return Err(TackError::Integrity {
                    task_id: task.id.clone(),
                    cause: format!(
                        "{}; revoking the assignment record also failed: {}",
                        e, revoke
                    ),
                });
            }
            return Err(self.rolled_back(agent_id, &task.id, e));
        }

        request.commit(assignment.clone());

        info!(
            agent = agent_id,
            task = %task.id,
            mode = %ranking.mode,
            score = chosen.combined,
            "task assigned"
        );
        self.record(
            Event::new(EventAction::Assign)
                .with_agent(agent_id)
                .with_task(&task.id)
                .with_details(json!({
                    "mode": ranking.mode,
                    "score": chosen.combined,
                    "fallback_reason": ranking.fallback_reason,
                })),
        );

        Ok(assignment)
    }

    fn rolled_back(&self, agent_id: &str, task_id: &str, cause: TackError) -> TackError {
        warn!(agent = agent_id, task = task_id, error = %cause, "assignment rolled back");
        self.record(
            Event::new(EventAction::Rollback)
                .with_agent(agent_id)
                .with_task(task_id)
                .with_details(json!({ "cause": cause.to_string() })),
        );
        TackError::Integrity {
            task_id: task_id.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Append to the audit log. The durable state is already committed, so a
    /// failed append is only logged.
    fn record(&self, event: Event) {
        if let Some(log) = &self.events
            && let Err(e) = log.append(&event)
        {
            warn!(action = %event.action, error = %e, "failed to append event");
        }
    }
}
