//! Workspace context resolution for tack.
//!
//! A workspace is a directory containing `.tack/`. Commands resolve it by
//! walking up from the current working directory, so `tack` works from any
//! subdirectory of a project.
//!
//! ```text
//! .tack/
//!   config.yaml
//!   tasks/                 task files (markdown + YAML frontmatter)
//!   state/assignments.json durable assignment records
//!   events/events.ndjson   append-only audit log
//!   locks/                 coordinator.lock
//! ```

use crate::error::{Result, TackError};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the workspace state directory.
pub const WORKSPACE_DIR: &str = ".tack";

/// Resolved paths for a tack workspace. All paths are absolute.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    /// Directory that contains `.tack/`.
    pub root: PathBuf,

    /// Absolute path to `.tack/`.
    pub state_dir: PathBuf,

    /// Absolute path to the locks directory.
    pub locks_dir: PathBuf,
}

impl WorkspaceContext {
    /// Resolve the workspace from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            TackError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the workspace from a specific directory, walking up ancestors
    /// until a `.tack/` directory is found.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let cwd = cwd.as_ref();

        let found = cwd
            .ancestors()
            .find(|dir| dir.join(WORKSPACE_DIR).is_dir())
            .ok_or_else(|| {
                TackError::UserError(format!(
                    "no tack workspace found in '{}' or any parent directory.\n\n\
                     Run `tack init` to create one.",
                    cwd.display()
                ))
            })?;

        Ok(Self::at(found))
    }

    /// Build a context rooted at `root` without checking that it exists.
    ///
    /// Used by `tack init` and by tests.
    pub fn at<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let state_dir = root.join(WORKSPACE_DIR);
        let locks_dir = state_dir.join("locks");
        Self {
            root,
            state_dir,
            locks_dir,
        }
    }

    /// Check if the workspace has been initialized.
    pub fn exists(&self) -> bool {
        self.state_dir.is_dir()
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join("config.yaml")
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.state_dir.join("tasks")
    }

    pub fn assignments_path(&self) -> PathBuf {
        self.state_dir.join("state").join("assignments.json")
    }

    pub fn events_dir(&self) -> PathBuf {
        self.state_dir.join("events")
    }

    pub fn events_file(&self) -> PathBuf {
        self.events_dir().join("events.ndjson")
    }

    /// Lock held by the single authoritative coordinator process.
    pub fn coordinator_lock_path(&self) -> PathBuf {
        self.locks_dir.join("coordinator.lock")
    }
}
