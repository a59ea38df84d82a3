//! RAII lock guard implementation.

use crate::error::{Result, TackError};
use std::fs;
use std::path::{Path, PathBuf};

/// RAII guard for a lock file.
///
/// When dropped, the lock file is deleted. If deletion fails a warning is
/// logged but no panic occurs.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    released: bool,
}

impl LockGuard {
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock before the guard goes out of scope, surfacing errors.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| {
            TackError::LockError(format!(
                "failed to release lock '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = fs::remove_file(&self.path)
        {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}
