//! Single JSON document store.
//!
//! Layout of `assignments.json`:
//!
//! ```text
//! {
//!   "agent-1": {
//!     "taskId": "TASK-001",
//!     "taskName": "Add login endpoint",
//!     "priority": "high",
//!     "estimatedHours": 4.0,
//!     "assignedAt": "2026-10-17T09:30:00Z"
//!   }
//! }
//! ```

use super::AssignmentStore;
use crate::error::{Result, TackError};
use crate::model::{Assignment, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAssignment {
    task_id: String,
    task_name: String,
    priority: Priority,
    estimated_hours: f64,
    assigned_at: DateTime<Utc>,
}

type Document = BTreeMap<String, StoredAssignment>;

/// Assignment store backed by one atomically rewritten JSON file.
#[derive(Debug)]
pub struct JsonAssignmentStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles from concurrent requests.
    write_lock: Mutex<()>,
}

impl JsonAssignmentStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Document> {
        if !self.path.exists() {
            return Ok(Document::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            TackError::Store(format!(
                "failed to read assignment store '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            TackError::Store(format!(
                "failed to parse assignment store '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write(&self, document: &Document) -> Result<()> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| TackError::Store(format!("failed to serialize assignments: {}", e)))?;
        crate::fs::atomic_write_file(&self.path, &json)
    }
}

impl AssignmentStore for JsonAssignmentStore {
    fn load_all(&self) -> Result<Vec<Assignment>> {
        let document = self.read()?;

        let mut seen = BTreeSet::new();
        for (agent_id, stored) in &document {
            if !seen.insert(stored.task_id.as_str()) {
                return Err(TackError::Store(format!(
                    "assignment store '{}' binds task '{}' to more than one agent (again at '{}')",
                    self.path.display(),
                    stored.task_id,
                    agent_id
                )));
            }
        }

        Ok(document
            .into_iter()
            .map(|(agent_id, stored)| Assignment {
                agent_id,
                task_id: stored.task_id,
                task_name: stored.task_name,
                priority: stored.priority,
                estimated_hours: stored.estimated_hours,
                assigned_at: stored.assigned_at,
            })
            .collect())
    }

    fn save(&self, assignment: &Assignment) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        let mut document = self.read()?;
        document.insert(
            assignment.agent_id.clone(),
            StoredAssignment {
                task_id: assignment.task_id.clone(),
                task_name: assignment.task_name.clone(),
                priority: assignment.priority,
                estimated_hours: assignment.estimated_hours,
                assigned_at: assignment.assigned_at,
            },
        );
        self.write(&document)
    }

    fn remove(&self, agent_id: &str) -> Result<bool> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        let mut document = self.read()?;
        if document.remove(agent_id).is_none() {
            return Ok(false);
        }
        self.write(&document)?;
        Ok(true)
    }
}
