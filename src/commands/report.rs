//! Implementation of the `tack report` command.

use super::engine::open_engine;
use super::require_workspace;
use crate::cli::{OutcomeArg, ReportArgs};
use crate::coordinator::{Outcome, ReleaseOutcome};
use crate::error::{Result, TackError};

pub fn cmd_report(args: ReportArgs) -> Result<()> {
    let outcome = outcome_from_args(&args)?;
    let ctx = require_workspace()?;
    let engine = open_engine(&ctx, "report")?;

    match engine
        .coordinator
        .report_outcome(&args.agent, &args.task, outcome.clone())?
    {
        ReleaseOutcome::Released(a) => {
            println!("Released {} from {} ({})", a.task_id, a.agent_id, outcome);
        }
        ReleaseOutcome::NotAssigned => {
            println!(
                "{} does not hold {}; nothing to release.",
                args.agent, args.task
            );
        }
    }

    Ok(())
}

fn outcome_from_args(args: &ReportArgs) -> Result<Outcome> {
    match (args.outcome, &args.reason) {
        (OutcomeArg::Completed, _) => Ok(Outcome::Completed),
        (OutcomeArg::Released, _) => Ok(Outcome::Released),
        (OutcomeArg::Blocked, Some(reason)) if !reason.trim().is_empty() => Ok(Outcome::Blocked {
            reason: reason.trim().to_string(),
        }),
        (OutcomeArg::Blocked, _) => Err(TackError::UserError(
            "--outcome blocked requires --reason".to_string(),
        )),
    }
}
