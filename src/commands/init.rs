//! Implementation of the `tack init` command.

use crate::config::Config;
use crate::context::WorkspaceContext;
use crate::error::{Result, TackError};
use crate::fs::atomic_write_file;
use std::fs;
use std::path::Path;

/// Create `.tack/` in the current directory.
///
/// Idempotent: existing config, tasks, and assignments are left alone.
pub fn cmd_init() -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| {
        TackError::UserError(format!("failed to get current working directory: {}", e))
    })?;
    let ctx = WorkspaceContext::at(&cwd);

    for dir in [
        ctx.state_dir.clone(),
        ctx.tasks_dir(),
        ctx.events_dir(),
        ctx.locks_dir.clone(),
    ] {
        create_dir(&dir)?;
    }
    if let Some(state) = ctx.assignments_path().parent() {
        create_dir(state)?;
    }

    let config_path = ctx.config_path();
    let created_config = !config_path.exists();
    if created_config {
        atomic_write_file(&config_path, &Config::default().to_yaml()?)?;
    }

    println!("Initialized tack workspace in {}", ctx.state_dir.display());
    println!();
    if created_config {
        println!("Created {}", config_path.display());
    }
    println!("Declare agents under `agents:` in config.yaml, then add task files to");
    println!("  {}", ctx.tasks_dir().display());

    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        TackError::UserError(format!(
            "failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}
