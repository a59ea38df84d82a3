//! Task file format for the file-backed backlog.
//!
//! Each task is a markdown file with YAML frontmatter. The frontmatter holds
//! the structured fields the engine consumes; the markdown body is the task
//! description. Unknown frontmatter fields survive a load/save round trip so
//! other tools can annotate task files freely.
//!
//! ```text
//! ---
//! id: TASK-001
//! title: Add login endpoint
//! status: todo
//! priority: high
//! labels: [backend, auth]
//! depends_on: [TASK-000]
//! estimated_hours: 4
//! ---
//!
//! Implement POST /login backed by the session store.
//! ```

use crate::error::{Result, TackError};
use crate::model::{Priority, Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

mod io;
mod mutations;
#[cfg(test)]
mod tests;

/// A parsed task file with frontmatter and markdown body.
#[derive(Debug, Clone)]
pub struct TaskFile {
    /// The parsed frontmatter fields.
    pub frontmatter: TaskFrontmatter,
    /// The markdown body (everything after the closing `---`).
    pub body: String,
}

/// Task frontmatter fields.
///
/// Known fields are explicitly typed, while unknown fields are preserved
/// in the `extra` map for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFrontmatter {
    /// Task identifier (e.g., "TASK-001").
    pub id: String,

    /// Task title, used as the task name.
    pub title: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: Priority,

    /// Skills or categories.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,

    /// Task IDs this task depends on.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,

    #[serde(default)]
    pub estimated_hours: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    /// Agent currently working the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    /// Why the task was moved to blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,

    /// Any fields not explicitly defined above.
    /// Using BTreeMap for deterministic serialization order.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl TaskFile {
    /// Build the engine view of this task.
    ///
    /// The body becomes the description (trimmed). A self-referencing
    /// dependency is dropped, and missing timestamps default to `fallback_time`.
    pub fn to_task(&self, fallback_time: DateTime<Utc>) -> Task {
        let fm = &self.frontmatter;
        let created_at = fm.created.unwrap_or(fallback_time);
        Task {
            id: fm.id.clone(),
            name: fm.title.clone(),
            description: self.body.trim().to_string(),
            status: fm.status,
            priority: fm.priority,
            labels: fm.labels.clone(),
            dependencies: fm
                .depends_on
                .iter()
                .filter(|dep| **dep != fm.id)
                .cloned()
                .collect(),
            estimated_hours: fm.estimated_hours,
            created_at,
            updated_at: fm.updated.unwrap_or(created_at),
        }
    }

    /// Parse a task file from its content string.
    ///
    /// The content must open with a `---` line, followed by YAML, a closing
    /// `---` line, and an optional markdown body. CRLF line endings are
    /// normalized to LF.
    ///
    /// # Examples
    ///
    /// ```
    /// use tack::task::TaskFile;
    ///
    /// let content = "---\nid: TASK-001\ntitle: Test task\n---\n\nDo something.\n";
    ///
    /// let task = TaskFile::parse(content).unwrap();
    /// assert_eq!(task.frontmatter.id, "TASK-001");
    /// assert_eq!(task.body, "\nDo something.\n");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let normalized = content.replace("\r\n", "\n");

        let rest = normalized
            .strip_prefix("---\n")
            .ok_or_else(|| {
                TackError::Backlog(
                    "task file must start with a '---' frontmatter delimiter".to_string(),
                )
            })?;

        // The closing delimiter may directly follow the opening one (empty YAML).
        let (yaml, body) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else {
            let close = rest.find("\n---").ok_or_else(|| {
                TackError::Backlog(
                    "task file missing closing '---' frontmatter delimiter".to_string(),
                )
            })?;
            (&rest[..close], &rest[close + 4..])
        };
        let body = body.strip_prefix('\n').unwrap_or(body);

        let frontmatter: TaskFrontmatter = serde_yaml::from_str(yaml)
            .map_err(|e| TackError::Backlog(format!("failed to parse task frontmatter: {}", e)))?;

        Ok(Self {
            frontmatter,
            body: body.to_string(),
        })
    }
}
