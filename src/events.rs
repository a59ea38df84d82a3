//! Append-only audit log of assignment transitions.
//!
//! Events are stored as NDJSON (one JSON object per line) in
//! `.tack/events/events.ndjson`. The coordinator appends one event after each
//! durable transition:
//!
//! - `assign`: an Assignment record was committed
//! - `release`: an agent reported an outcome and its record was removed
//! - `rollback`: a reserved task could not be committed and was released
//!
//! `tack lock clear` also records a `lock_clear` event.
//!
//! The log is advisory. The assignment store is the source of truth, so a
//! failed append is logged and never undoes a committed transition.
//!
//! ```no_run
//! use tack::events::{Event, EventAction, EventLog};
//! use serde_json::json;
//!
//! let log = EventLog::new(".tack/events/events.ndjson");
//! let event = Event::new(EventAction::Assign)
//!     .with_agent("agent-1")
//!     .with_task("TASK-001")
//!     .with_details(json!({"mode": "fallback"}));
//! log.append(&event)?;
//! # Ok::<(), tack::error::TackError>(())
//! ```

use crate::error::{Result, TackError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Task handed to an agent (Reserved -> Assigned)
    Assign,
    /// Assignment removed after an outcome report (Assigned -> Released)
    Release,
    /// Reservation rolled back after a failed durable write
    Rollback,
    /// Stale coordinator lock removed by an operator
    LockClear,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Assign => write!(f, "assign"),
            EventAction::Release => write!(f, "release"),
            EventAction::Rollback => write!(f, "rollback"),
            EventAction::LockClear => write!(f, "lock_clear"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// Process that performed the action (`user@HOST`).
    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    /// Freeform action-specific details.
    pub details: Value,
}

impl Event {
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: crate::locks::owner_string(),
            agent: None,
            task: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent = Some(agent_id.into());
        self
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task = Some(task_id.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| TackError::Store(format!("failed to serialize event to JSON: {}", e)))
    }
}

/// Appender for the NDJSON event log.
///
/// Appends from concurrent requests are serialized so lines never interleave.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl EventLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single line and sync it to disk.
    pub fn append(&self, event: &Event) -> Result<()> {
        let json_line = event.to_ndjson_line()?;
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        if let Some(dir) = self.path.parent()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| {
                TackError::Store(format!(
                    "failed to create events directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                TackError::Store(format!(
                    "failed to open events file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", json_line).map_err(|e| {
            TackError::Store(format!(
                "failed to write event to '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        file.sync_all().map_err(|e| {
            TackError::Store(format!(
                "failed to sync events file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Read every event in the log. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<Event>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            TackError::Store(format!(
                "failed to read events file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    TackError::Store(format!(
                        "malformed event on line {} of '{}': {}",
                        i + 1,
                        self.path.display(),
                        e
                    ))
                })
            })
            .collect()
    }
}
