//! Task records and their lifecycle.
//!
//! A task exists only once it has been started. The lifecycle is a two-state
//! machine: `Active` is the sole initial state and `Finished` is terminal.
//! `start` and `finish` are pure; the caller supplies the clock reading.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};

/// Delimiter between note segments in a multi-part note.
pub const NOTE_DELIMITER: &str = "|";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    Finished,
}

impl TaskStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status filter for store queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    Active,
    Finished,
    #[default]
    All,
}

impl StatusFilter {
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::Active => status == TaskStatus::Active,
            StatusFilter::Finished => status == TaskStatus::Finished,
            StatusFilter::All => true,
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(StatusFilter::Active),
            "finished" => Ok(StatusFilter::Finished),
            "all" => Ok(StatusFilter::All),
            other => Err(Error::Validation(format!(
                "unknown status filter '{other}' (expected active, finished, or all)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: TaskStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    /// Whole minutes between start and finish; `None` while active.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_minutes())
    }

    /// Latest lifecycle timestamp (finish if present, otherwise start).
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.finished_at.unwrap_or(self.started_at)
    }

    /// Note segments split on the note delimiter, trimmed, empties dropped.
    pub fn note_segments(&self) -> Vec<&str> {
        self.notes
            .as_deref()
            .map(|notes| {
                notes
                    .split(NOTE_DELIMITER)
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check the record-level invariants.
    ///
    /// Returns a human-readable reason on violation; the store turns it into
    /// a corruption or validation error depending on where it was found.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("task id is empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err(format!("task {} has an empty name", self.id));
        }
        match (self.status, self.finished_at) {
            (TaskStatus::Active, Some(_)) => {
                return Err(format!("active task {} has a finish time", self.id));
            }
            (TaskStatus::Finished, None) => {
                return Err(format!("finished task {} has no finish time", self.id));
            }
            (TaskStatus::Finished, Some(finished)) if finished < self.started_at => {
                return Err(format!(
                    "task {} finished at {} before it started at {}",
                    self.id,
                    finished.to_rfc3339(),
                    self.started_at.to_rfc3339()
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Request to start a new task
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub name: String,
    pub notes: Option<String>,
}

impl StartRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Request to finish an active task
#[derive(Debug, Clone, Default)]
pub struct FinishRequest {
    pub id: String,
    pub notes: Option<String>,
}

impl FinishRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

pub fn generate_task_id() -> String {
    Ulid::new().to_string().to_lowercase()
}

/// Start a task: produces a new `Active` record stamped with `now`.
pub fn start(request: StartRequest, now: DateTime<Utc>) -> Result<Task> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("task name cannot be empty".to_string()));
    }

    Ok(Task {
        id: generate_task_id(),
        name: name.to_string(),
        notes: normalize_notes(request.notes),
        status: TaskStatus::Active,
        started_at: now,
        finished_at: None,
    })
}

/// Finish a task: returns a `Finished` copy stamped with `now`.
///
/// Notes are replaced only when the request carries a non-blank value.
pub fn finish(task: &Task, notes: Option<String>, now: DateTime<Utc>) -> Result<Task> {
    if task.status != TaskStatus::Active {
        return Err(Error::InvalidTransition {
            id: task.id.clone(),
            status: task.status,
            action: "finish",
        });
    }
    if now < task.started_at {
        return Err(Error::Validation(format!(
            "finish time {} is before start time {} for task {}",
            now.to_rfc3339(),
            task.started_at.to_rfc3339(),
            task.id
        )));
    }

    let mut finished = task.clone();
    finished.status = TaskStatus::Finished;
    finished.finished_at = Some(now);
    if let Some(notes) = normalize_notes(notes) {
        finished.notes = Some(notes);
    }
    Ok(finished)
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, hour, minute, 0).unwrap()
    }

    #[test]
    fn start_produces_active_task() {
        let task = start(StartRequest::new("  Write spec  "), at(9, 0)).unwrap();
        assert_eq!(task.name, "Write spec");
        assert_eq!(task.status, TaskStatus::Active);
        assert_eq!(task.started_at, at(9, 0));
        assert!(task.finished_at.is_none());
        assert!(task.notes.is_none());
        assert_eq!(task.id.len(), 26);
        assert!(task.check_invariants().is_ok());
    }

    #[test]
    fn start_rejects_blank_name() {
        for name in ["", "   ", "\t\n"] {
            let err = start(StartRequest::new(name), at(9, 0)).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{name:?}: {err:?}");
        }
    }

    #[test]
    fn start_assigns_distinct_ids() {
        let first = start(StartRequest::new("a"), at(9, 0)).unwrap();
        let second = start(StartRequest::new("b"), at(9, 0)).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn start_drops_blank_notes() {
        let task = start(StartRequest::new("a").with_notes("  "), at(9, 0)).unwrap();
        assert!(task.notes.is_none());
    }

    #[test]
    fn finish_marks_finished_and_keeps_notes() {
        let task = start(StartRequest::new("Write spec").with_notes("draft"), at(9, 0)).unwrap();
        let done = finish(&task, None, at(10, 30)).unwrap();
        assert_eq!(done.status, TaskStatus::Finished);
        assert_eq!(done.finished_at, Some(at(10, 30)));
        assert_eq!(done.notes.as_deref(), Some("draft"));
        assert_eq!(done.id, task.id);
        assert_eq!(done.started_at, task.started_at);
        assert_eq!(done.duration_minutes(), Some(90));
    }

    #[test]
    fn finish_replaces_notes_when_supplied() {
        let task = start(StartRequest::new("Write spec").with_notes("draft"), at(9, 0)).unwrap();
        let done = finish(&task, Some("shipped".to_string()), at(9, 5)).unwrap();
        assert_eq!(done.notes.as_deref(), Some("shipped"));
    }

    #[test]
    fn finish_twice_is_invalid_transition() {
        let task = start(StartRequest::new("Write spec"), at(9, 0)).unwrap();
        let done = finish(&task, None, at(9, 0)).unwrap();
        let err = finish(&done, None, at(11, 0)).unwrap_err();
        match err {
            Error::InvalidTransition { id, status, action } => {
                assert_eq!(id, task.id);
                assert_eq!(status, TaskStatus::Finished);
                assert_eq!(action, "finish");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn finish_before_start_is_rejected() {
        let task = start(StartRequest::new("Write spec"), at(9, 0)).unwrap();
        let err = finish(&task, None, at(8, 59)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn invariants_catch_inconsistent_records() {
        let mut task = start(StartRequest::new("a"), at(9, 0)).unwrap();
        task.finished_at = Some(at(10, 0));
        assert!(task.check_invariants().is_err());

        task.status = TaskStatus::Finished;
        task.finished_at = None;
        assert!(task.check_invariants().is_err());

        task.finished_at = Some(at(8, 0));
        assert!(task.check_invariants().is_err());

        task.finished_at = Some(at(9, 0));
        assert!(task.check_invariants().is_ok());
    }

    #[test]
    fn note_segments_split_on_delimiter() {
        let mut task = start(StartRequest::new("a"), at(9, 0)).unwrap();
        task.notes = Some("first | second || third ".to_string());
        assert_eq!(task.note_segments(), vec!["first", "second", "third"]);
    }

    #[test]
    fn status_filter_parses_known_values() {
        assert_eq!(StatusFilter::parse("Active").unwrap(), StatusFilter::Active);
        assert_eq!(StatusFilter::parse("finished").unwrap(), StatusFilter::Finished);
        assert_eq!(StatusFilter::parse(" all ").unwrap(), StatusFilter::All);
        assert!(StatusFilter::parse("done").is_err());
    }
}
