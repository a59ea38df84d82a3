//! Command implementations for tack.
//!
//! Each command resolves the workspace itself. Commands that change
//! assignments hold the coordinator lock for their whole run.

mod assign;
mod engine;
mod init;
mod lock;
mod rank;
mod report;
mod status;

#[cfg(test)]
mod tests;

use crate::cli::{Command, LockAction};
use crate::context::WorkspaceContext;
use crate::error::{Result, TackError};

/// Route a parsed command to its handler.
pub async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Assign(args) => assign::cmd_assign(args).await,
        Command::Report(args) => report::cmd_report(args),
        Command::Status => status::cmd_status(),
        Command::Rank(args) => rank::cmd_rank(args).await,
        Command::Lock(lock_cmd) => match lock_cmd.action {
            LockAction::Show => lock::cmd_lock_show(),
            LockAction::Clear(args) => lock::cmd_lock_clear(args),
        },
    }
}

/// Resolve the workspace, failing with a hint if it has not been initialized.
pub(crate) fn require_workspace() -> Result<WorkspaceContext> {
    let ctx = WorkspaceContext::resolve()?;
    if !ctx.exists() {
        return Err(TackError::UserError(
            "tack workspace not initialized.\n\nRun `tack init` first.".to_string(),
        ));
    }
    Ok(ctx)
}
