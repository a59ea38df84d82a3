//! Safety filter for deploy/release work.
//!
//! A task whose name or labels mention a release keyword may only be handed
//! out once everything it depends on is Done.

use crate::error::{Result, TackError};
use crate::model::{Task, TaskStatus};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// A candidate the filter removed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub task_id: String,
    pub reason: String,
}

/// Output of [`SafetyFilter::apply`].
#[derive(Debug, Clone, Default)]
pub struct SafetyReport {
    pub allowed: Vec<Task>,
    pub excluded: Vec<Exclusion>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escape `keyword` and anchor it at word boundaries.
///
/// `\b` only holds next to a word character, so an edge that starts or ends
/// with punctuation (`c++`, `#ship`) is left unanchored.
fn keyword_pattern(keyword: &str) -> String {
    let mut pattern = String::new();
    if keyword.chars().next().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(keyword));
    if keyword.chars().next_back().is_some_and(is_word_char) {
        pattern.push_str(r"\b");
    }
    pattern
}

#[derive(Debug, Clone)]
pub struct SafetyFilter {
    pattern: Regex,
}

impl SafetyFilter {
    /// Build a filter matching any of `keywords` as a whole word, ignoring
    /// case.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(keyword_pattern)
            .collect();
        if alternatives.is_empty() {
            return Err(TackError::Config(
                "safety filter needs at least one keyword".to_string(),
            ));
        }

        let source = format!("(?i)(?:{})", alternatives.join("|"));
        let pattern = Regex::new(&source).map_err(|e| {
            TackError::Config(format!("invalid safety keyword pattern: {}", e))
        })?;

        Ok(Self { pattern })
    }

    /// Whether the task's name or any label names a release-type activity.
    pub fn is_safety_sensitive(&self, task: &Task) -> bool {
        self.pattern.is_match(&task.name) || task.labels.iter().any(|l| self.pattern.is_match(l))
    }

    /// Check one task against the backlog's statuses.
    ///
    /// `Ok(None)` means the task may be assigned, `Ok(Some(reason))` means it
    /// is held back. An error means the check itself could not be completed.
    fn check(
        &self,
        task: &Task,
        statuses: &BTreeMap<&str, TaskStatus>,
    ) -> std::result::Result<Option<String>, String> {
        if !self.is_safety_sensitive(task) {
            return Ok(None);
        }

        let mut pending = Vec::new();
        for dep in &task.dependencies {
            match statuses.get(dep.as_str()) {
                Some(TaskStatus::Done) => {}
                Some(_) => pending.push(dep.as_str()),
                None => return Err(format!("dependency '{}' is not in the backlog", dep)),
            }
        }

        if pending.is_empty() {
            Ok(None)
        } else {
            Ok(Some(format!(
                "release task waiting on unfinished dependencies: {}",
                pending.join(", ")
            )))
        }
    }

    /// Split `candidates` into allowed and excluded tasks.
    ///
    /// `backlog` is the full task list, used to look up dependency status. A
    /// task whose check fails is excluded; the others are unaffected.
    pub fn apply(&self, candidates: Vec<Task>, backlog: &[Task]) -> SafetyReport {
        let statuses: BTreeMap<&str, TaskStatus> =
            backlog.iter().map(|t| (t.id.as_str(), t.status)).collect();

        let mut report = SafetyReport::default();
        for task in candidates {
            let held = match self.check(&task, &statuses) {
                Ok(held) => held,
                Err(e) => Some(format!("safety check failed: {}", e)),
            };

            match held {
                None => report.allowed.push(task),
                Some(reason) => {
                    debug!(task = %task.id, %reason, "excluded by safety filter");
                    report.excluded.push(Exclusion {
                        task_id: task.id,
                        reason,
                    });
                }
            }
        }

        report
    }
}
