//! Atomic filesystem writes.
//!
//! Every durable write in tack (assignment store, task files) goes through
//! [`atomic_write`]: the content is written to a temporary file in the same
//! directory, synced to disk, then renamed over the target. A crash leaves
//! either the old or the new file, never a torn one.
//!
//! Temporary names carry the process id and a per-process counter so that
//! concurrent writers inside one coordinator never share a temp file. On
//! crash a stray `.{filename}.{pid}.{n}.tmp` may remain; it is never read.

use crate::error::{Result, TackError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Atomically write bytes to a file, creating parent directories as needed.
///
/// # Example
///
/// ```no_run
/// use tack::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("state/assignments.json"), b"{}")?;
/// # Ok::<(), tack::error::TackError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            TackError::Store(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;
    replace(&temp_path, path)
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TackError::Store(format!("invalid file path '{}'", target.display())))?;

    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(".{}.{}.{}.tmp", filename, std::process::id(), n);
    Ok(parent.join(temp_name))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        TackError::Store(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        TackError::Store(format!("failed to write temporary file: {}", e))
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        TackError::Store(format!("failed to sync temporary file to disk: {}", e))
    })
}

/// Rename `source` over `target`. `std::fs::rename` replaces an existing
/// target on every supported platform.
fn replace(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        TackError::Store(format!(
            "failed to atomically replace '{}': {}",
            target.display(),
            e
        ))
    })?;

    // Persist the directory entry as well.
    #[cfg(unix)]
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}
