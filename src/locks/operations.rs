//! Lock acquisition, inspection, and clearing.

use super::guard::LockGuard;
use super::metadata::LockMetadata;
use super::types::LockInfo;
use crate::context::WorkspaceContext;
use crate::error::{Result, TackError};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Create a lock file exclusively and write its metadata.
///
/// Fails with `TackError::LockError` if the file already exists.
fn acquire_lock(lock_path: &Path, metadata: &LockMetadata) -> Result<LockGuard> {
    if let Some(parent) = lock_path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            TackError::LockError(format!(
                "failed to create locks directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                let holder = match LockMetadata::from_file(lock_path) {
                    Ok(meta) => format!(
                        "\nLock: {} (created {} ago by {})\nAction: {}",
                        lock_path.display(),
                        meta.age_string(),
                        meta.owner,
                        meta.action
                    ),
                    Err(_) => format!("\nLock: {}", lock_path.display()),
                };
                TackError::LockError(format!(
                    "another coordinator is serving this workspace{}\n\n\
                     If that process is gone, run `tack lock clear`.",
                    holder
                ))
            } else {
                TackError::LockError(format!(
                    "failed to acquire lock '{}': {}",
                    lock_path.display(),
                    e
                ))
            }
        })?;

    let json = metadata.to_json()?;
    file.write_all(json.as_bytes()).map_err(|e| {
        let _ = fs::remove_file(lock_path);
        TackError::LockError(format!("failed to write lock metadata: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(lock_path);
        TackError::LockError(format!("failed to sync lock file: {}", e))
    })?;

    Ok(LockGuard::new(lock_path.to_path_buf()))
}

/// Acquire the coordinator lock for the lifetime of the returned guard.
pub fn acquire_coordinator_lock(ctx: &WorkspaceContext, action: &str) -> Result<LockGuard> {
    acquire_lock(&ctx.coordinator_lock_path(), &LockMetadata::new(action))
}

/// Read the current coordinator lock, if any.
pub fn read_coordinator_lock(ctx: &WorkspaceContext) -> Result<Option<LockInfo>> {
    let path = ctx.coordinator_lock_path();
    if !path.exists() {
        return Ok(None);
    }
    let metadata = LockMetadata::from_file(&path)?;
    Ok(Some(LockInfo { path, metadata }))
}

/// Remove a leftover coordinator lock.
///
/// The caller is responsible for making sure the holder is gone.
pub fn clear_coordinator_lock(ctx: &WorkspaceContext) -> Result<LockInfo> {
    let path = ctx.coordinator_lock_path();
    if !path.exists() {
        return Err(TackError::UserError(format!(
            "no coordinator lock at: {}",
            path.display()
        )));
    }

    // Tolerate a corrupt lock file: clearing it is exactly the fix.
    let metadata = LockMetadata::from_file(&path).unwrap_or_else(|_| LockMetadata::new("unknown"));

    fs::remove_file(&path).map_err(|e| {
        TackError::LockError(format!("failed to clear lock '{}': {}", path.display(), e))
    })?;

    Ok(LockInfo { path, metadata })
}
