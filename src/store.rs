//! File-backed task store.
//!
//! The store owns the authoritative in-memory task list and its backing
//! file. The file is loaded wholesale when the store is opened and rewritten
//! wholesale (atomically) on every mutation. A load that finds a malformed
//! file or a record breaking a task invariant fails with `StorageCorrupt`
//! instead of handing partial data inward.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::task::{self, FinishRequest, StartRequest, StatusFilter, Task, TaskStatus};

pub const TASKS_SCHEMA_VERSION: &str = "tasklog.tasks.v1";

/// On-disk representation of the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

impl TaskSnapshot {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            schema_version: TASKS_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            tasks,
        }
    }
}

#[derive(Debug)]
pub struct TaskStore {
    storage: Storage,
    tasks: Vec<Task>,
    pending_write: bool,
}

impl TaskStore {
    /// Open the store, loading the backing file
    pub fn open(storage: Storage) -> Result<Self> {
        let tasks = load_tasks(&storage.tasks_file())?;
        tracing::debug!(count = tasks.len(), path = %storage.tasks_file().display(), "loaded tasks");
        Ok(Self {
            storage,
            tasks,
            pending_write: false,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn path(&self) -> PathBuf {
        self.storage.tasks_file()
    }

    /// Read-only view in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True when the in-memory state has changes that failed to persist
    pub fn has_pending_write(&self) -> bool {
        self.pending_write
    }

    /// Re-read the backing file
    pub fn load(&self) -> Result<Vec<Task>> {
        load_tasks(&self.path())
    }

    /// Atomically overwrite the backing file with `tasks`
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let path = self.path();
        if self.storage.config().storage.backup {
            if let Err(err) = self.storage.backup(&path, &self.storage.backup_file()) {
                tracing::warn!(%err, "failed to back up task store before saving");
            }
        }
        self.storage
            .write_json(&path, &TaskSnapshot::new(tasks.to_vec()))?;
        tracing::debug!(count = tasks.len(), path = %path.display(), "saved tasks");
        Ok(())
    }

    /// Retry persisting the in-memory state after a failed write
    pub fn retry_save(&mut self) -> Result<()> {
        self.save(&self.tasks)?;
        self.pending_write = false;
        Ok(())
    }

    /// Persist the in-memory state to another file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.storage
            .write_json(path, &TaskSnapshot::new(self.tasks.clone()))
    }

    /// Append a task, assigning an id when blank
    ///
    /// The record is kept in memory even if the write fails; the error is
    /// `StorageWrite` and `has_pending_write` reports true until a save
    /// succeeds.
    pub fn append(&mut self, mut task: Task) -> Result<Task> {
        if task.id.trim().is_empty() {
            task.id = task::generate_task_id();
        }
        task.check_invariants().map_err(Error::Validation)?;
        if self.tasks.iter().any(|existing| existing.id == task.id) {
            return Err(Error::Validation(format!(
                "duplicate task id: {}",
                task.id
            )));
        }

        self.tasks.push(task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Apply `mutation` to the task with `id` and persist the result
    ///
    /// The mutation may only perform the Active -> Finished transition; any
    /// other change to identity, name, or start time is rejected. An unknown
    /// id fails with `NotFound` before anything is written.
    pub fn update<F>(&mut self, id: &str, mutation: F) -> Result<Task>
    where
        F: FnOnce(&Task) -> Result<Task>,
    {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let current = &self.tasks[index];
        let updated = mutation(current)?;
        check_legal_update(current, &updated)?;

        self.tasks[index] = updated.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Tasks matching `filter`, ascending by start time (ties keep insertion order)
    pub fn query(&self, filter: StatusFilter) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|task| filter.matches(task.status))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.started_at);
        tasks
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Most recently active tasks, newest first
    pub fn recent(&self, limit: usize) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        tasks.sort_by(|left, right| right.last_activity().cmp(&left.last_activity()));
        tasks.truncate(limit);
        tasks
    }

    /// Resolve user input to a task id
    ///
    /// Accepts a full id, a unique id prefix (case-insensitive), or the exact
    /// name of a single active task.
    pub fn resolve(&self, input: &str) -> Result<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("task reference cannot be empty".to_string()));
        }

        let needle = trimmed.to_lowercase();
        if let Some(task) = self.tasks.iter().find(|task| task.id == needle) {
            return Ok(task.id.clone());
        }

        let mut matches: Vec<&str> = self
            .tasks
            .iter()
            .filter(|task| task.id.starts_with(&needle))
            .map(|task| task.id.as_str())
            .collect();
        if matches.len() == 1 {
            return Ok(matches[0].to_string());
        }
        if matches.len() > 1 {
            matches.sort_unstable();
            return Err(Error::Validation(format!(
                "ambiguous task id '{}': {}",
                trimmed,
                matches.join(", ")
            )));
        }

        let by_name: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.is_active() && task.name == trimmed)
            .collect();
        match by_name.as_slice() {
            [task] => Ok(task.id.clone()),
            [] => Err(Error::NotFound(trimmed.to_string())),
            many => Err(Error::Validation(format!(
                "several active tasks are named '{}': {}",
                trimmed,
                many.iter()
                    .map(|task| task.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Start a task and append it
    pub fn start_task(&mut self, request: StartRequest, now: DateTime<Utc>) -> Result<Task> {
        let task = task::start(request, now)?;
        self.append(task)
    }

    /// Finish the task named by `request.id`
    pub fn finish_task(&mut self, request: FinishRequest, now: DateTime<Utc>) -> Result<Task> {
        let FinishRequest { id, notes } = request;
        self.update(&id, |current| task::finish(current, notes, now))
    }

    fn persist(&mut self) -> Result<()> {
        match self.save(&self.tasks) {
            Ok(()) => {
                self.pending_write = false;
                Ok(())
            }
            Err(err) => {
                self.pending_write = true;
                Err(err)
            }
        }
    }
}

/// Read and validate a backing file; a missing file is an empty store
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(Error::StorageCorrupt {
                path: path.to_path_buf(),
                reason: format!("unreadable: {err}"),
            })
        }
    };

    let corrupt = |reason: String| Error::StorageCorrupt {
        path: path.to_path_buf(),
        reason,
    };

    let snapshot: TaskSnapshot =
        serde_json::from_str(&content).map_err(|err| corrupt(format!("invalid JSON: {err}")))?;

    if snapshot.schema_version != TASKS_SCHEMA_VERSION {
        return Err(corrupt(format!(
            "unsupported schema version '{}' (expected {})",
            snapshot.schema_version, TASKS_SCHEMA_VERSION
        )));
    }

    let mut seen = HashSet::new();
    for task in &snapshot.tasks {
        task.check_invariants().map_err(corrupt)?;
        if !seen.insert(task.id.as_str()) {
            return Err(corrupt(format!("duplicate task id {}", task.id)));
        }
    }

    Ok(snapshot.tasks)
}

fn check_legal_update(current: &Task, updated: &Task) -> Result<()> {
    if updated.id != current.id
        || updated.name != current.name
        || updated.started_at != current.started_at
    {
        return Err(Error::Validation(format!(
            "task {} may only change notes, status, and finish time",
            current.id
        )));
    }
    if updated.status != current.status {
        if !(current.status == TaskStatus::Active && updated.status == TaskStatus::Finished) {
            return Err(Error::InvalidTransition {
                id: current.id.clone(),
                status: current.status,
                action: "change",
            });
        }
    } else if updated != current {
        return Err(Error::InvalidTransition {
            id: current.id.clone(),
            status: current.status,
            action: "modify",
        });
    }
    updated.check_invariants().map_err(Error::Validation)
}
