//! Activity history for tasklog
//!
//! Stores append-only start/finish records in the data directory as JSON
//! lines. Writing history never fails a command: callers get a warning
//! string instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Storage;
use crate::task::Task;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Started,
    Finished,
}

/// One history line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: HistoryKind,
    pub task_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

impl HistoryEntry {
    pub fn started(task: &Task) -> Self {
        Self {
            timestamp: task.started_at,
            kind: HistoryKind::Started,
            task_id: task.id.clone(),
            name: task.name.clone(),
            duration_minutes: None,
        }
    }

    pub fn finished(task: &Task) -> Self {
        Self {
            timestamp: task.last_activity(),
            kind: HistoryKind::Finished,
            task_id: task.id.clone(),
            name: task.name.clone(),
            duration_minutes: task.duration_minutes(),
        }
    }

    /// Single-line rendering for terminal output
    pub fn describe(&self) -> String {
        let stamp = self.timestamp.format("%Y-%m-%d %H:%M");
        match (self.kind, self.duration_minutes) {
            (HistoryKind::Started, _) => format!("{stamp} started {} ({})", self.name, self.task_id),
            (HistoryKind::Finished, Some(minutes)) => format!(
                "{stamp} finished {} ({}, {} min)",
                self.name, self.task_id, minutes
            ),
            (HistoryKind::Finished, None) => {
                format!("{stamp} finished {} ({})", self.name, self.task_id)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct History<'a> {
    storage: &'a Storage,
}

impl<'a> History<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn is_enabled(&self) -> bool {
        self.storage.config().history.enabled
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.storage
            .append_jsonl(&self.storage.history_file(), entry)
    }

    /// Append and turn any failure into a warning message
    pub fn append_best_effort(&self, entry: &HistoryEntry) -> Option<String> {
        match self.append(entry) {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(%err, "failed to append history entry");
                Some(format!("history not updated: {err}"))
            }
        }
    }

    /// Last `limit` entries, oldest first
    pub fn read(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let mut entries: Vec<HistoryEntry> =
            self.storage.read_jsonl(&self.storage.history_file())?;
        if let Some(limit) = limit {
            let skip = entries.len().saturating_sub(limit);
            entries.drain(..skip);
        }
        Ok(entries)
    }
}
