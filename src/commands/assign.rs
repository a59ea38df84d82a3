//! Implementation of the `tack assign` command.

use super::engine::open_engine;
use super::require_workspace;
use crate::cli::AssignArgs;
use crate::coordinator::AssignmentOutcome;
use crate::error::{Result, TackError};
use serde_json::json;

pub async fn cmd_assign(args: AssignArgs) -> Result<()> {
    let ctx = require_workspace()?;
    let engine = open_engine(&ctx, "assign")?;

    let outcome = engine.coordinator.request_assignment(&args.agent).await?;

    if args.json {
        let value = match &outcome {
            AssignmentOutcome::Assigned(a) => json!({ "status": "assigned", "assignment": a }),
            AssignmentOutcome::Existing(a) => json!({ "status": "existing", "assignment": a }),
            AssignmentOutcome::NoTaskAvailable => json!({ "status": "no_task_available" }),
        };
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| TackError::UserError(format!("failed to render JSON: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    match outcome {
        AssignmentOutcome::Assigned(a) => {
            println!("Assigned {} to {}", a.task_id, a.agent_id);
            println!("  {} ({} priority, {}h)", a.task_name, a.priority, a.estimated_hours);
        }
        AssignmentOutcome::Existing(a) => {
            println!("{} already holds {}", a.agent_id, a.task_id);
            println!(
                "  Report an outcome with `tack report {} {} --outcome ...`",
                a.agent_id, a.task_id
            );
        }
        AssignmentOutcome::NoTaskAvailable => {
            println!("No task available for {}.", args.agent);
        }
    }

    Ok(())
}
