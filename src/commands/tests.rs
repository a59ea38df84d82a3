//! End-to-end tests for the CLI commands against an on-disk workspace.

use super::*;
use crate::backlog::{Backlog, FileBacklog};
use crate::cli::{AssignArgs, LockClearArgs, OutcomeArg, RankArgs, ReportArgs};
use crate::events::{EventAction, EventLog};
use crate::model::TaskStatus;
use crate::store::{AssignmentStore, JsonAssignmentStore};
use crate::test_support::{DirGuard, create_test_workspace, write_task_file};
use serial_test::serial;
use tempfile::TempDir;

fn assign(agent: &str) -> AssignArgs {
    AssignArgs {
        agent: agent.to_string(),
        json: false,
    }
}

fn report(agent: &str, task: &str, outcome: OutcomeArg, reason: Option<&str>) -> ReportArgs {
    ReportArgs {
        agent: agent.to_string(),
        task: task.to_string(),
        outcome,
        reason: reason.map(str::to_string),
    }
}

fn task_status(root: &std::path::Path, id: &str) -> TaskStatus {
    FileBacklog::new(WorkspaceContext::at(root).tasks_dir())
        .list_tasks()
        .unwrap()
        .into_iter()
        .find(|t| t.id == id)
        .unwrap()
        .status
}

#[test]
#[serial]
fn test_init_creates_layout_and_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let _guard = DirGuard::new(temp_dir.path());

    init::cmd_init().unwrap();
    let ctx = WorkspaceContext::at(temp_dir.path());
    assert!(ctx.config_path().is_file());
    assert!(ctx.tasks_dir().is_dir());
    assert!(ctx.events_dir().is_dir());
    assert!(ctx.locks_dir.is_dir());

    std::fs::write(ctx.config_path(), "agents:\n  - id: keep-me\n").unwrap();
    init::cmd_init().unwrap();
    let config = std::fs::read_to_string(ctx.config_path()).unwrap();
    assert!(config.contains("keep-me"));
}

#[test]
#[serial]
fn test_commands_require_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let _guard = DirGuard::new(temp_dir.path());

    let err = status::cmd_status().unwrap_err();
    assert!(err.to_string().contains("tack init"));
}

#[tokio::test]
#[serial]
async fn test_assign_and_complete_round() {
    let temp_dir = create_test_workspace();
    write_task_file(
        temp_dir.path(),
        "TASK-001",
        "title: Build API\nlabels: [backend]\n",
        "Expose the endpoints.",
    );
    write_task_file(temp_dir.path(), "TASK-002", "title: Style page\nlabels: [frontend]\n", "");
    let _guard = DirGuard::new(temp_dir.path());

    assign::cmd_assign(assign("agent-1")).await.unwrap();
    assert_eq!(task_status(temp_dir.path(), "TASK-001"), TaskStatus::InProgress);

    let ctx = WorkspaceContext::at(temp_dir.path());
    let records = JsonAssignmentStore::new(ctx.assignments_path())
        .load_all()
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].task_id, "TASK-001");

    report::cmd_report(report("agent-1", "TASK-001", OutcomeArg::Completed, None)).unwrap();
    assert_eq!(task_status(temp_dir.path(), "TASK-001"), TaskStatus::Done);
    assert!(
        JsonAssignmentStore::new(ctx.assignments_path())
            .load_all()
            .unwrap()
            .is_empty()
    );

    // The lock is released after every command.
    assert!(!ctx.coordinator_lock_path().exists());

    let actions: Vec<EventAction> = EventLog::new(ctx.events_file())
        .read_all()
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec![EventAction::Assign, EventAction::Release]);

    status::cmd_status().unwrap();
}

#[tokio::test]
#[serial]
async fn test_rank_does_not_assign() {
    let temp_dir = create_test_workspace();
    write_task_file(temp_dir.path(), "TASK-001", "title: Build API\n", "");
    let _guard = DirGuard::new(temp_dir.path());

    rank::cmd_rank(RankArgs {
        agent: "agent-1".to_string(),
        json: true,
    })
    .await
    .unwrap();

    assert_eq!(task_status(temp_dir.path(), "TASK-001"), TaskStatus::Todo);
}

#[tokio::test]
#[serial]
async fn test_rank_table_with_and_without_candidates() {
    let temp_dir = create_test_workspace();
    let _guard = DirGuard::new(temp_dir.path());

    let args = || RankArgs {
        agent: "agent-1".to_string(),
        json: false,
    };
    rank::cmd_rank(args()).await.unwrap();

    write_task_file(temp_dir.path(), "TASK-001", "title: Build API\n", "");
    rank::cmd_rank(args()).await.unwrap();
    assert_eq!(task_status(temp_dir.path(), "TASK-001"), TaskStatus::Todo);
}

#[tokio::test]
#[serial]
async fn test_held_lock_blocks_second_coordinator() {
    let temp_dir = create_test_workspace();
    write_task_file(temp_dir.path(), "TASK-001", "title: Build API\n", "");
    let _guard = DirGuard::new(temp_dir.path());
    let ctx = WorkspaceContext::at(temp_dir.path());

    let held = crate::locks::acquire_coordinator_lock(&ctx, "test").unwrap();
    let err = assign::cmd_assign(assign("agent-1")).await.unwrap_err();
    assert!(matches!(err, TackError::LockError(_)));
    drop(held);

    assign::cmd_assign(assign("agent-1")).await.unwrap();
}

#[test]
#[serial]
fn test_lock_clear_requires_force() {
    let temp_dir = create_test_workspace();
    let _guard = DirGuard::new(temp_dir.path());
    let ctx = WorkspaceContext::at(temp_dir.path());

    let held = crate::locks::acquire_coordinator_lock(&ctx, "test").unwrap();
    std::mem::forget(held);

    assert!(lock::cmd_lock_clear(LockClearArgs { force: false }).is_err());
    assert!(ctx.coordinator_lock_path().exists());

    lock::cmd_lock_show().unwrap();
    lock::cmd_lock_clear(LockClearArgs { force: true }).unwrap();
    assert!(!ctx.coordinator_lock_path().exists());
}

#[test]
#[serial]
fn test_blocked_report_needs_reason() {
    let temp_dir = create_test_workspace();
    let _guard = DirGuard::new(temp_dir.path());

    let err = report::cmd_report(report("agent-1", "TASK-001", OutcomeArg::Blocked, None))
        .unwrap_err();
    assert!(matches!(err, TackError::UserError(_)));
}

#[tokio::test]
#[serial]
async fn test_blocked_report_records_reason() {
    let temp_dir = create_test_workspace();
    write_task_file(temp_dir.path(), "TASK-001", "title: Build API\n", "");
    let _guard = DirGuard::new(temp_dir.path());

    assign::cmd_assign(assign("agent-1")).await.unwrap();
    report::cmd_report(report(
        "agent-1",
        "TASK-001",
        OutcomeArg::Blocked,
        Some("needs credentials"),
    ))
    .unwrap();

    let content = std::fs::read_to_string(
        WorkspaceContext::at(temp_dir.path())
            .tasks_dir()
            .join("TASK-001.md"),
    )
    .unwrap();
    assert!(content.contains("status: blocked"));
    assert!(content.contains("needs credentials"));
}

#[tokio::test]
#[serial]
async fn test_missing_reasoning_credentials_fail_at_startup() {
    let temp_dir = create_test_workspace();
    let _guard = DirGuard::new(temp_dir.path());
    let ctx = WorkspaceContext::at(temp_dir.path());
    std::fs::write(
        ctx.config_path(),
        "reasoning:\n  enabled: true\n  endpoint: http://127.0.0.1:9\n  api_key_env: TACK_TEST_UNSET_KEY\nagents:\n  - id: agent-1\n",
    )
    .unwrap();
    // SAFETY: serialized with other env-mutating tests.
    unsafe { std::env::remove_var("TACK_TEST_UNSET_KEY") };

    let err = assign::cmd_assign(assign("agent-1")).await.unwrap_err();
    assert!(matches!(err, TackError::Config(_)));
    assert!(!ctx.coordinator_lock_path().exists());
}
