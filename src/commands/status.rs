//! Implementation of the `tack status` command.
//!
//! Read-only: reads the backlog and the assignment store directly and does
//! not take the coordinator lock.

use super::engine::load_config;
use super::require_workspace;
use crate::backlog::{Backlog, FileBacklog};
use crate::error::Result;
use crate::locks;
use crate::model::TaskStatus;
use crate::store::{AssignmentStore, JsonAssignmentStore};
use std::collections::BTreeMap;

const STATUSES: &[TaskStatus] = &[
    TaskStatus::Todo,
    TaskStatus::InProgress,
    TaskStatus::Blocked,
    TaskStatus::Done,
];

pub fn cmd_status() -> Result<()> {
    let ctx = require_workspace()?;
    let config = load_config(&ctx)?;
    let tasks = FileBacklog::new(ctx.tasks_dir()).list_tasks()?;
    let assignments = JsonAssignmentStore::new(ctx.assignments_path()).load_all()?;

    println!("Tack Status");
    println!("===========");
    println!();

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for task in &tasks {
        *counts.entry(task.status.to_string()).or_default() += 1;
    }
    println!("Backlog:");
    for status in STATUSES {
        let count = counts.get(&status.to_string()).copied().unwrap_or(0);
        println!("  {:12} {:>3}", status.to_string(), count);
    }
    println!("  ------------");
    println!("  {:12} {:>3}", "total", tasks.len());
    println!();

    let by_agent: BTreeMap<&str, &str> = assignments
        .iter()
        .map(|a| (a.agent_id.as_str(), a.task_id.as_str()))
        .collect();

    println!("Agents:");
    if config.agents.is_empty() {
        println!("  none declared in config.yaml");
    }
    for agent in &config.agents {
        match by_agent.get(agent.id.as_str()) {
            Some(task) => println!("  {:16} working on {}", agent.id, task),
            None => println!("  {:16} available", agent.id),
        }
    }
    for a in &assignments {
        if !config.agents.iter().any(|agent| agent.id == a.agent_id) {
            println!("  {:16} holds {} (not in config)", a.agent_id, a.task_id);
        }
    }
    println!();

    match locks::read_coordinator_lock(&ctx)? {
        Some(info) => println!("Coordinator lock: {}", info),
        None => println!("Coordinator lock: free"),
    }

    Ok(())
}
