//! Backlog over a directory of markdown task files.

use super::Backlog;
use crate::error::{Result, TackError};
use crate::model::Task;
use crate::task::TaskFile;
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Task files (`*.md`) in one directory, keyed by their frontmatter `id`.
#[derive(Debug)]
pub struct FileBacklog {
    tasks_dir: PathBuf,
    /// Serializes read-modify-write cycles on task files.
    write_lock: Mutex<()>,
}

impl FileBacklog {
    pub fn new<P: AsRef<Path>>(tasks_dir: P) -> Self {
        Self {
            tasks_dir: tasks_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn tasks_dir(&self) -> &Path {
        &self.tasks_dir
    }

    /// Load every task file, keyed by task id.
    ///
    /// A missing directory is an empty backlog. Two files declaring the same
    /// id is an error: the engine cannot tell which one is authoritative.
    fn index(&self) -> Result<BTreeMap<String, (PathBuf, TaskFile)>> {
        let mut index = BTreeMap::new();
        if !self.tasks_dir.exists() {
            return Ok(index);
        }

        let entries = fs::read_dir(&self.tasks_dir).map_err(|e| {
            TackError::Backlog(format!(
                "failed to read tasks directory '{}': {}",
                self.tasks_dir.display(),
                e
            ))
        })?;

        for entry in entries {
            let entry = entry
                .map_err(|e| TackError::Backlog(format!("failed to read directory entry: {}", e)))?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }

            let file = TaskFile::load(&path)?;
            let id = file.frontmatter.id.clone();
            if let Some((existing, _)) = index.get(&id) {
                return Err(TackError::Backlog(format!(
                    "task id '{}' is declared by both '{}' and '{}'",
                    id,
                    existing.display(),
                    path.display()
                )));
            }
            index.insert(id, (path, file));
        }

        Ok(index)
    }

    fn update<F>(&self, task_id: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut TaskFile),
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        let mut index = self.index()?;
        let (path, mut file) = index.remove(task_id).ok_or_else(|| {
            TackError::Backlog(format!(
                "task '{}' not found in '{}'",
                task_id,
                self.tasks_dir.display()
            ))
        })?;

        mutate(&mut file);
        file.save(&path)
    }
}

impl Backlog for FileBacklog {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        let now = Utc::now();
        Ok(self
            .index()?
            .into_values()
            .map(|(_, file)| file.to_task(now))
            .collect())
    }

    fn mark_task_in_progress(&self, task_id: &str, agent_id: &str) -> Result<()> {
        self.update(task_id, |file| file.set_in_progress(agent_id, Utc::now()))
    }

    fn mark_task_blocked(&self, task_id: &str, reason: &str) -> Result<()> {
        self.update(task_id, |file| file.set_blocked(reason, Utc::now()))
    }

    fn mark_task_done(&self, task_id: &str) -> Result<()> {
        self.update(task_id, |file| file.set_done(Utc::now()))
    }
}
