//! Wiring a coordinator for one CLI invocation.

use crate::backlog::{Backlog, FileBacklog};
use crate::config::Config;
use crate::context::WorkspaceContext;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::events::EventLog;
use crate::locks::{self, LockGuard};
use crate::reasoning::{HttpReasoningService, ReasoningService};
use crate::store::{AssignmentStore, JsonAssignmentStore};
use std::sync::Arc;
use tracing::debug;

/// A coordinator together with the lock that makes it authoritative.
///
/// The lock is released when this is dropped.
pub(super) struct Engine {
    pub coordinator: Coordinator,
    _lock: LockGuard,
}

/// Load config, or defaults when the workspace has none.
pub(super) fn load_config(ctx: &WorkspaceContext) -> Result<Config> {
    let path = ctx.config_path();
    if path.exists() {
        Config::load(&path)
    } else {
        debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::default())
    }
}

/// Take the coordinator lock and build a coordinator over the workspace.
///
/// Configuration problems, including missing reasoning credentials, fail
/// here before any request is served.
pub(super) fn open_engine(ctx: &WorkspaceContext, action: &str) -> Result<Engine> {
    let config = load_config(ctx)?;
    let reasoning = reasoning_service(&config)?;

    let lock = locks::acquire_coordinator_lock(ctx, action)?;

    let backlog: Arc<dyn Backlog> = Arc::new(FileBacklog::new(ctx.tasks_dir()));
    let store: Arc<dyn AssignmentStore> =
        Arc::new(JsonAssignmentStore::new(ctx.assignments_path()));
    let coordinator = Coordinator::open(&config, backlog, store, reasoning)?
        .with_event_log(EventLog::new(ctx.events_file()));

    Ok(Engine {
        coordinator,
        _lock: lock,
    })
}

fn reasoning_service(config: &Config) -> Result<Option<Arc<dyn ReasoningService>>> {
    let Some(api_key) = config.reasoning_credentials()? else {
        return Ok(None);
    };
    let service = HttpReasoningService::new(config.reasoning.endpoint.clone(), api_key);
    debug!(service = ?service, "reasoning service enabled");
    Ok(Some(Arc::new(service)))
}
