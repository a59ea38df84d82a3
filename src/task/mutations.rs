//! Status transitions applied by the file-backed backlog.

use super::TaskFile;
use crate::model::TaskStatus;
use chrono::{DateTime, Utc};

impl TaskFile {
    /// Move the task to in-progress for `agent_id`.
    pub fn set_in_progress(&mut self, agent_id: &str, now: DateTime<Utc>) {
        self.frontmatter.status = TaskStatus::InProgress;
        self.frontmatter.assigned_to = Some(agent_id.to_string());
        self.frontmatter.blocked_reason = None;
        self.frontmatter.updated = Some(now);
    }

    /// Move the task to blocked, recording why.
    pub fn set_blocked(&mut self, reason: &str, now: DateTime<Utc>) {
        self.frontmatter.status = TaskStatus::Blocked;
        self.frontmatter.assigned_to = None;
        self.frontmatter.blocked_reason = Some(reason.to_string());
        self.frontmatter.updated = Some(now);
    }

    /// Move the task to done.
    pub fn set_done(&mut self, now: DateTime<Utc>) {
        self.frontmatter.status = TaskStatus::Done;
        self.frontmatter.assigned_to = None;
        self.frontmatter.blocked_reason = None;
        self.frontmatter.updated = Some(now);
    }
}
