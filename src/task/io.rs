//! File I/O operations for task files.

use super::TaskFile;
use crate::error::{Result, TackError};
use std::path::Path;

impl TaskFile {
    /// Load a task file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TackError::Backlog(format!(
                "failed to read task file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content).map_err(|e| match e {
            TackError::Backlog(msg) => TackError::Backlog(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Atomically save the task file to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.render()?;
        crate::fs::atomic_write_file(path, &content).map_err(|e| match e {
            TackError::Store(msg) => TackError::Backlog(msg),
            other => other,
        })
    }

    /// Render the task file as frontmatter followed by the body.
    pub fn render(&self) -> Result<String> {
        let frontmatter_yaml = serde_yaml::to_string(&self.frontmatter).map_err(|e| {
            TackError::Backlog(format!("failed to serialize task frontmatter: {}", e))
        })?;

        let mut output = String::with_capacity(frontmatter_yaml.len() + self.body.len() + 8);
        output.push_str("---\n");
        output.push_str(&frontmatter_yaml);
        output.push_str("---\n");
        output.push_str(&self.body);
        Ok(output)
    }
}
