//! Durable assignment store.
//!
//! The store is the source of truth for which agent holds which task. It is
//! loaded in full when a coordinator starts, before any request is served,
//! and every change is written through before the coordinator acknowledges
//! it.

mod json;
#[cfg(test)]
mod tests;

pub use json::JsonAssignmentStore;

use crate::error::Result;
use crate::model::Assignment;

/// Persistence for live Assignment records, keyed by agent id.
pub trait AssignmentStore: Send + Sync {
    /// Every live record, ordered by agent id.
    fn load_all(&self) -> Result<Vec<Assignment>>;

    /// Insert or replace the record for `assignment.agent_id`.
    fn save(&self, assignment: &Assignment) -> Result<()>;

    /// Remove the record for `agent_id`. Returns whether one existed.
    fn remove(&self, agent_id: &str) -> Result<bool>;
}
