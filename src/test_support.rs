//! Shared fixtures and fakes for unit tests.

use crate::backlog::Backlog;
use crate::context::WorkspaceContext;
use crate::error::{Result, TackError};
use crate::model::{Assignment, Task, TaskStatus};
use crate::reasoning::{
    AgentContext, ImpactReply, ProjectContext, ReasoningError, ReasoningService, SuitabilityReply,
};
use crate::store::AssignmentStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::Duration;
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory is process-global; hold the lock even if a
        // #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Create an initialized workspace with an empty task directory.
pub(crate) fn create_test_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let ctx = WorkspaceContext::at(temp_dir.path());
    std::fs::create_dir_all(ctx.tasks_dir()).unwrap();
    std::fs::create_dir_all(&ctx.locks_dir).unwrap();
    std::fs::write(
        ctx.config_path(),
        "agents:\n  - id: agent-1\n    skills: [backend]\n  - id: agent-2\n    skills: [frontend]\n",
    )
    .unwrap();
    temp_dir
}

/// Write a task file into a workspace created by [`create_test_workspace`].
pub(crate) fn write_task_file(root: &Path, id: &str, frontmatter: &str, body: &str) {
    let path = WorkspaceContext::at(root)
        .tasks_dir()
        .join(format!("{}.md", id));
    std::fs::write(path, format!("---\nid: {}\n{}---\n\n{}\n", id, frontmatter, body)).unwrap();
}

/// In-memory backlog with failure injection.
#[derive(Default)]
pub(crate) struct MemoryBacklog {
    tasks: Mutex<BTreeMap<String, Task>>,
    fail_mark_in_progress: AtomicBool,
    fail_listing: AtomicBool,
}

impl MemoryBacklog {
    pub(crate) fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks.into_iter().map(|t| (t.id.clone(), t)).collect()),
            ..Self::default()
        }
    }

    pub(crate) fn task(&self, id: &str) -> Option<Task> {
        self.tasks.lock().unwrap().get(id).cloned()
    }

    pub(crate) fn set_status(&self, id: &str, status: TaskStatus) {
        if let Some(task) = self.tasks.lock().unwrap().get_mut(id) {
            task.status = status;
        }
    }

    pub(crate) fn fail_mark_in_progress(&self, fail: bool) {
        self.fail_mark_in_progress.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    fn update(&self, id: &str, status: TaskStatus) -> Result<()> {
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| TackError::Backlog(format!("task '{}' not found", id)))?;
        task.status = status;
        Ok(())
    }
}

impl Backlog for MemoryBacklog {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(TackError::Backlog("injected listing failure".to_string()));
        }
        Ok(self.tasks.lock().unwrap().values().cloned().collect())
    }

    fn mark_task_in_progress(&self, task_id: &str, _agent_id: &str) -> Result<()> {
        if self.fail_mark_in_progress.load(Ordering::SeqCst) {
            return Err(TackError::Backlog("injected write failure".to_string()));
        }
        self.update(task_id, TaskStatus::InProgress)
    }

    fn mark_task_blocked(&self, task_id: &str, _reason: &str) -> Result<()> {
        self.update(task_id, TaskStatus::Blocked)
    }

    fn mark_task_done(&self, task_id: &str) -> Result<()> {
        self.update(task_id, TaskStatus::Done)
    }
}

/// In-memory assignment store with failure injection.
#[derive(Default)]
pub(crate) struct MemoryStore {
    records: Mutex<BTreeMap<String, Assignment>>,
    fail_save: AtomicBool,
    fail_remove: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn records(&self) -> Vec<Assignment> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    pub(crate) fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_remove(&self, fail: bool) {
        self.fail_remove.store(fail, Ordering::SeqCst);
    }
}

impl AssignmentStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Assignment>> {
        Ok(self.records())
    }

    fn save(&self, assignment: &Assignment) -> Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(TackError::Store("injected save failure".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .insert(assignment.agent_id.clone(), assignment.clone());
        Ok(())
    }

    fn remove(&self, agent_id: &str) -> Result<bool> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(TackError::Store("injected remove failure".to_string()));
        }
        Ok(self.records.lock().unwrap().remove(agent_id).is_some())
    }
}

/// Reasoning service with canned replies per task id.
///
/// Unscripted tasks get a middling suitability and no impact.
#[derive(Default)]
pub(crate) struct ScriptedReasoning {
    suitability: BTreeMap<String, SuitabilityReply>,
    impact: BTreeMap<String, ImpactReply>,
    delay: Option<Duration>,
    failing: AtomicBool,
    calls: AtomicUsize,
    impact_contexts: Mutex<Vec<(String, ProjectContext)>>,
}

impl ScriptedReasoning {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_suitability(
        mut self,
        task_id: &str,
        suitability: f64,
        confidence: f64,
    ) -> Self {
        self.suitability.insert(
            task_id.to_string(),
            SuitabilityReply {
                suitability_score: suitability,
                confidence_score: confidence,
            },
        );
        self
    }

    pub(crate) fn with_impact(mut self, task_id: &str, days: f64, risk: f64) -> Self {
        self.impact.insert(
            task_id.to_string(),
            ImpactReply {
                timeline_reduction_days: days,
                risk_reduction: risk,
            },
        );
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn impact_contexts(&self) -> Vec<(String, ProjectContext)> {
        self.impact_contexts.lock().unwrap().clone()
    }

    async fn before_call(&self) -> std::result::Result<(), ReasoningError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ReasoningError::Status {
                status: 503,
                message: "scripted outage".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoning {
    async fn score_suitability(
        &self,
        task: &Task,
        _agent: &AgentContext,
    ) -> std::result::Result<SuitabilityReply, ReasoningError> {
        self.before_call().await?;
        Ok(self
            .suitability
            .get(&task.id)
            .copied()
            .unwrap_or(SuitabilityReply {
                suitability_score: 0.5,
                confidence_score: 1.0,
            }))
    }

    async fn predict_impact(
        &self,
        task: &Task,
        project: &ProjectContext,
    ) -> std::result::Result<ImpactReply, ReasoningError> {
        self.before_call().await?;
        self.impact_contexts
            .lock()
            .unwrap()
            .push((task.id.clone(), project.clone()));
        Ok(self.impact.get(&task.id).copied().unwrap_or(ImpactReply {
            timeline_reduction_days: 0.0,
            risk_reduction: 0.0,
        }))
    }
}
