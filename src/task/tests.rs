//! Tests for task file parsing, serialization, and mutations.

use super::*;
use chrono::TimeZone;

const MINIMAL_TASK: &str = r#"---
id: TASK-001
title: Test task
---

Do something.
"#;

const FULL_TASK: &str = r#"---
id: TASK-002
title: Deploy API to production
status: blocked
priority: urgent
labels:
  - devops
  - backend
depends_on:
  - TASK-001
  - TASK-002
estimated_hours: 2.5
created: 2026-01-13T10:00:00Z
blocked_reason: waiting on credentials
reviewer: alice
---

## Objective
Ship it.
"#;

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_parse_minimal_task_uses_defaults() {
    let task = TaskFile::parse(MINIMAL_TASK).unwrap();

    assert_eq!(task.frontmatter.id, "TASK-001");
    assert_eq!(task.frontmatter.title, "Test task");
    assert_eq!(task.frontmatter.status, TaskStatus::Todo);
    assert_eq!(task.frontmatter.priority, Priority::Medium);
    assert!(task.frontmatter.labels.is_empty());
    assert_eq!(task.body, "\nDo something.\n");
}

#[test]
fn test_parse_full_task() {
    let task = TaskFile::parse(FULL_TASK).unwrap();
    let fm = &task.frontmatter;

    assert_eq!(fm.status, TaskStatus::Blocked);
    assert_eq!(fm.priority, Priority::Urgent);
    assert!(fm.labels.contains("devops"));
    assert_eq!(fm.estimated_hours, 2.5);
    assert_eq!(fm.blocked_reason.as_deref(), Some("waiting on credentials"));
    assert_eq!(fm.extra["reviewer"], serde_yaml::Value::from("alice"));
}

#[test]
fn test_parse_crlf_line_endings() {
    let content = MINIMAL_TASK.replace('\n', "\r\n");
    let task = TaskFile::parse(&content).unwrap();
    assert_eq!(task.frontmatter.id, "TASK-001");
    assert_eq!(task.body, "\nDo something.\n");
}

#[test]
fn test_parse_rejects_missing_delimiters() {
    assert!(TaskFile::parse("id: TASK-001\n").is_err());
    assert!(TaskFile::parse("---\nid: TASK-001\ntitle: x\n").is_err());
}

#[test]
fn test_parse_rejects_unknown_status() {
    let content = "---\nid: TASK-001\ntitle: x\nstatus: sideways\n---\n";
    assert!(matches!(
        TaskFile::parse(content),
        Err(TackError::Backlog(_))
    ));
}

#[test]
fn test_to_task_drops_self_dependency() {
    let task = TaskFile::parse(FULL_TASK).unwrap().to_task(fixed_time());

    assert_eq!(task.name, "Deploy API to production");
    assert_eq!(task.description, "## Objective\nShip it.");
    assert!(task.dependencies.contains("TASK-001"));
    assert!(!task.dependencies.contains("TASK-002"));
    assert_eq!(task.updated_at, task.created_at);
}

#[test]
fn test_to_task_defaults_missing_timestamps() {
    let task = TaskFile::parse(MINIMAL_TASK).unwrap().to_task(fixed_time());
    assert_eq!(task.created_at, fixed_time());
}

#[test]
fn test_round_trip_preserves_unknown_fields() {
    let task = TaskFile::parse(FULL_TASK).unwrap();
    let rendered = task.render().unwrap();
    let reparsed = TaskFile::parse(&rendered).unwrap();

    assert_eq!(reparsed.frontmatter.extra["reviewer"], serde_yaml::Value::from("alice"));
    assert_eq!(reparsed.body, task.body);
}

#[test]
fn test_status_mutations() {
    let mut task = TaskFile::parse(MINIMAL_TASK).unwrap();

    task.set_in_progress("agent-1", fixed_time());
    assert_eq!(task.frontmatter.status, TaskStatus::InProgress);
    assert_eq!(task.frontmatter.assigned_to.as_deref(), Some("agent-1"));

    task.set_blocked("needs API key", fixed_time());
    assert_eq!(task.frontmatter.status, TaskStatus::Blocked);
    assert!(task.frontmatter.assigned_to.is_none());
    assert_eq!(task.frontmatter.blocked_reason.as_deref(), Some("needs API key"));

    task.set_done(fixed_time());
    assert_eq!(task.frontmatter.status, TaskStatus::Done);
    assert!(task.frontmatter.blocked_reason.is_none());
    assert_eq!(task.frontmatter.updated, Some(fixed_time()));
}
