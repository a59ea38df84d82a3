//! Implementation of the `tack lock` commands.

use super::require_workspace;
use crate::cli::LockClearArgs;
use crate::error::{Result, TackError};
use crate::events::{Event, EventAction, EventLog};
use crate::locks;
use serde_json::json;
use tracing::warn;

pub fn cmd_lock_show() -> Result<()> {
    let ctx = require_workspace()?;

    match locks::read_coordinator_lock(&ctx)? {
        Some(info) => println!("{}", info),
        None => println!("No coordinator lock held."),
    }

    Ok(())
}

pub fn cmd_lock_clear(args: LockClearArgs) -> Result<()> {
    if !args.force {
        return Err(TackError::UserError(
            "clearing the coordinator lock requires --force.\n\n\
             Only clear it when no tack process is running."
                .to_string(),
        ));
    }

    let ctx = require_workspace()?;
    let cleared = locks::clear_coordinator_lock(&ctx)?;

    let event = Event::new(EventAction::LockClear).with_details(json!({
        "owner": cleared.metadata.owner,
        "pid": cleared.metadata.pid,
        "age": cleared.metadata.age_string(),
    }));
    if let Err(e) = EventLog::new(ctx.events_file()).append(&event) {
        warn!(error = %e, "failed to append lock clear event");
    }

    println!("Cleared coordinator lock held by {}", cleared.metadata.owner);
    Ok(())
}
