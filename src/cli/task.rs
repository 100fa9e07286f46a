//! tasklog task command implementations.

use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::history::{History, HistoryEntry};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::report::format_minutes;
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::{FinishRequest, StartRequest, StatusFilter, Task};

pub struct StartOptions {
    pub name: String,
    pub notes: Option<String>,
}

pub struct FinishOptions {
    pub task: String,
    pub notes: Option<String>,
}

#[derive(Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct HistoryOutput {
    total: usize,
    entries: Vec<HistoryEntry>,
}

pub fn run_start(storage: Storage, options: StartOptions, output: OutputOptions) -> Result<()> {
    let mut store = TaskStore::open(storage)?;
    let mut request = StartRequest::new(options.name);
    request.notes = options.notes;

    let task = store.start_task(request, Utc::now())?;
    let history_warning =
        History::new(store.storage()).append_best_effort(&HistoryEntry::started(&task));

    let mut human = HumanOutput::new("Task started");
    if let Some(warning) = history_warning {
        human.push_warning(warning);
    }
    human.push_summary("ID", task.id.clone());
    human.push_summary("Name", task.name.clone());
    human.push_summary("Started", task.started_at.format("%Y-%m-%d %H:%M UTC").to_string());
    human.push_next_step(format!("tasklog finish {}", short_id(&task.id)));

    emit_success(output, "start", &task, &human)
}

pub fn run_finish(storage: Storage, options: FinishOptions, output: OutputOptions) -> Result<()> {
    let mut store = TaskStore::open(storage)?;
    let id = store.resolve(&options.task)?;
    let mut request = FinishRequest::new(id);
    request.notes = options.notes;

    let task = store.finish_task(request, Utc::now())?;
    let history_warning =
        History::new(store.storage()).append_best_effort(&HistoryEntry::finished(&task));

    let mut human = HumanOutput::new("Task finished");
    if let Some(warning) = history_warning {
        human.push_warning(warning);
    }
    human.push_summary("ID", task.id.clone());
    human.push_summary("Name", task.name.clone());
    if let Some(minutes) = task.duration_minutes() {
        human.push_summary("Duration", format_minutes(minutes));
    }

    emit_success(output, "finish", &task, &human)
}

pub fn run_list(storage: Storage, status: &str, output: OutputOptions) -> Result<()> {
    let filter = StatusFilter::parse(status)?;
    let store = TaskStore::open(storage)?;
    let tasks = store.query(filter);

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(task_line(task));
    }

    emit_success(
        output,
        "list",
        &TaskListOutput {
            total: tasks.len(),
            tasks,
        },
        &human,
    )
}

pub fn run_show(storage: Storage, input: &str, output: OutputOptions) -> Result<()> {
    let store = TaskStore::open(storage)?;
    let task = store.get(&store.resolve(input)?)?;

    let mut human = HumanOutput::new(format!("Task {}", task.name));
    human.push_summary("ID", task.id.clone());
    human.push_summary("Status", task.status.to_string());
    human.push_summary(
        "Started",
        task.started_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    if let Some(finished) = task.finished_at {
        human.push_summary("Finished", finished.format("%Y-%m-%d %H:%M UTC").to_string());
    }
    if let Some(minutes) = task.duration_minutes() {
        human.push_summary("Duration", format_minutes(minutes));
    }
    let segments = task.note_segments();
    if segments.is_empty() {
        human.push_detail("No notes.");
    }
    for segment in segments {
        human.push_detail(format!("> {segment}"));
    }

    emit_success(output, "show", &task, &human)
}

pub fn run_recent(storage: Storage, limit: Option<usize>, output: OutputOptions) -> Result<()> {
    let limit = limit.unwrap_or(storage.config().report.recent_limit);
    if limit == 0 {
        return Err(crate::error::Error::Validation(
            "limit must be greater than zero".to_string(),
        ));
    }
    let store = TaskStore::open(storage)?;
    let tasks = store.recent(limit);

    let mut human = HumanOutput::new("Recent tasks");
    human.push_summary("Shown", tasks.len().to_string());
    for task in &tasks {
        human.push_detail(format!(
            "{} {}",
            task.last_activity().format("%Y-%m-%d %H:%M"),
            task_line(task)
        ));
    }

    emit_success(
        output,
        "recent",
        &TaskListOutput {
            total: tasks.len(),
            tasks,
        },
        &human,
    )
}

pub fn run_history(storage: Storage, limit: usize, output: OutputOptions) -> Result<()> {
    let history = History::new(&storage);
    let entries = history.read(Some(limit))?;

    let mut human = HumanOutput::new("History");
    if !history.is_enabled() {
        human.push_warning("history is disabled in tasklog.toml");
    }
    human.push_summary("Shown", entries.len().to_string());
    for entry in &entries {
        human.push_detail(entry.describe());
    }

    emit_success(
        output,
        "history",
        &HistoryOutput {
            total: entries.len(),
            entries,
        },
        &human,
    )
}

fn task_line(task: &Task) -> String {
    let duration = task
        .duration_minutes()
        .map(format_minutes)
        .unwrap_or_else(|| "in progress".to_string());
    format!(
        "[{}] {} {} ({})",
        task.status,
        short_id(&task.id),
        task.name,
        duration
    )
}

/// Short id for display; `resolve` accepts any unique prefix
fn short_id(id: &str) -> &str {
    id.get(..10).unwrap_or(id)
}
