//! Tack: a task assignment engine for autonomous agents.
//!
//! Agents pull work from a shared backlog. For each request the
//! [`coordinator::Coordinator`] ranks the free tasks, reserves the best one,
//! and records the assignment durably, so no task is ever held by two agents
//! and assignments survive a restart. When the external reasoning service is
//! unavailable the ranking falls back to skill overlap and priority.

pub mod analysis;
pub mod backlog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod model;
pub mod reasoning;
pub mod store;
pub mod task;

#[cfg(test)]
mod test_support;
