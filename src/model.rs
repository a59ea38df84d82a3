//! Task, agent and assignment data model.
//!
//! These are plain data types. The only behavior here is small derived
//! helpers; every state transition is owned by the coordinator or the
//! backlog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "todo"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Blocked => write!(f, "blocked"),
            TaskStatus::Done => write!(f, "done"),
        }
    }
}

/// Task priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Priority mapped into `[0, 1]`, used as the deterministic impact estimate.
    pub fn weight(self) -> f64 {
        match self {
            Priority::Low => 0.25,
            Priority::Medium => 0.5,
            Priority::High => 0.75,
            Priority::Urgent => 1.0,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
        }
    }
}

/// A unit of work in the backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Skills or categories, matched against agent skills.
    pub labels: BTreeSet<String>,
    /// Ids of tasks that must be Done first. Never contains `id`.
    pub dependencies: BTreeSet<String>,
    pub estimated_hours: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a Todo task with medium priority and no metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            labels: BTreeSet::new(),
            dependencies: BTreeSet::new(),
            estimated_hours: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set dependencies, dropping any reference to the task itself.
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self.dependencies.remove(&self.id);
        self
    }

    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Open tasks are the only assignable ones.
    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Todo
    }
}

/// Availability of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Available,
    Working,
    Offline,
}

/// An autonomous worker pulling tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub status: AgentStatus,
    /// Task currently reserved or assigned to this agent, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task_id: Option<String>,
}

impl Agent {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            role: String::new(),
            skills: BTreeSet::new(),
            status: AgentStatus::Available,
            current_task_id: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }
}

/// Durable record binding one agent to one task.
///
/// Carries enough task metadata to rebuild in-flight state after a restart
/// without asking the backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub agent_id: String,
    pub task_id: String,
    pub task_name: String,
    pub priority: Priority,
    pub estimated_hours: f64,
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(agent_id: &str, task: &Task) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            priority: task.priority,
            estimated_hours: task.estimated_hours,
            assigned_at: Utc::now(),
        }
    }
}
