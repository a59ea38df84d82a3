//! Backlog boundary.
//!
//! The engine never creates or edits tasks on its own; it reads the task list
//! and asks the backlog to move a task between statuses. [`Backlog`] is the
//! seam, and [`FileBacklog`] is the bundled implementation over a directory
//! of task files.

mod file;

pub use file::FileBacklog;

use crate::error::Result;
use crate::model::Task;

/// Storage for work items, owned by the surrounding workflow.
///
/// Implementations must be safe to call from concurrent requests.
pub trait Backlog: Send + Sync {
    /// Every task, in any status. Needed to check whether dependencies are done.
    fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Tasks that may be handed out.
    fn list_open_tasks(&self) -> Result<Vec<Task>> {
        Ok(self
            .list_tasks()?
            .into_iter()
            .filter(Task::is_open)
            .collect())
    }

    fn mark_task_in_progress(&self, task_id: &str, agent_id: &str) -> Result<()>;

    fn mark_task_blocked(&self, task_id: &str, reason: &str) -> Result<()>;

    fn mark_task_done(&self, task_id: &str) -> Result<()>;
}
