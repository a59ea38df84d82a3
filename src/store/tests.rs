//! Tests for the JSON assignment store.

use super::*;
use crate::error::TackError;
use crate::model::{Priority, Task};
use tempfile::TempDir;

fn store() -> (TempDir, JsonAssignmentStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonAssignmentStore::new(temp_dir.path().join("state").join("assignments.json"));
    (temp_dir, store)
}

fn assignment(agent: &str, task: &str) -> Assignment {
    let task = Task::new(task, format!("Task {}", task))
        .with_priority(Priority::High)
        .with_estimate(2.0);
    Assignment::new(agent, &task)
}

#[test]
fn test_missing_file_loads_empty() {
    let (_temp_dir, store) = store();
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_save_then_load_in_new_instance() {
    let (_temp_dir, store) = store();
    let record = assignment("agent-1", "TASK-001");
    store.save(&record).unwrap();

    // A fresh instance simulates a process restart.
    let reloaded = JsonAssignmentStore::new(store.path()).load_all().unwrap();
    assert_eq!(reloaded, vec![record]);
}

#[test]
fn test_layout_is_keyed_by_agent() {
    let (_temp_dir, store) = store();
    store.save(&assignment("agent-1", "TASK-001")).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    let entry = &raw["agent-1"];
    assert_eq!(entry["taskId"], "TASK-001");
    assert_eq!(entry["taskName"], "Task TASK-001");
    assert_eq!(entry["priority"], "high");
    assert_eq!(entry["estimatedHours"], 2.0);
    assert!(entry.get("assignedAt").is_some());
    assert!(entry.get("agentId").is_none());
}

#[test]
fn test_remove_is_idempotent() {
    let (_temp_dir, store) = store();
    store.save(&assignment("agent-1", "TASK-001")).unwrap();

    assert!(store.remove("agent-1").unwrap());
    assert!(!store.remove("agent-1").unwrap());
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_duplicate_task_ids_fail_to_load() {
    let (_temp_dir, store) = store();
    store.save(&assignment("agent-1", "TASK-001")).unwrap();
    store.save(&assignment("agent-2", "TASK-001")).unwrap();

    assert!(matches!(store.load_all(), Err(TackError::Store(_))));
}

#[test]
fn test_corrupt_file_is_a_store_error() {
    let (_temp_dir, store) = store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "{ not json").unwrap();

    assert!(matches!(store.load_all(), Err(TackError::Store(_))));
}

#[test]
fn test_concurrent_saves_keep_every_record() {
    let (_temp_dir, store) = store();
    let store = std::sync::Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                store
                    .save(&assignment(&format!("agent-{}", i), &format!("TASK-{:03}", i)))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.load_all().unwrap().len(), 8);
}
