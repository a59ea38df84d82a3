//! Lock information returned to callers.

use super::metadata::LockMetadata;
use std::path::PathBuf;

/// Information about an existing lock file.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The lock file path.
    pub path: PathBuf,

    /// The lock metadata.
    pub metadata: LockMetadata,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (owner: {}, pid: {}, age: {}, action: {})",
            self.path.display(),
            self.metadata.owner,
            self.metadata
                .pid
                .map(|p| p.to_string())
                .unwrap_or_else(|| "?".to_string()),
            self.metadata.age_string(),
            self.metadata.action
        )
    }
}
