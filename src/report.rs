//! Weekly report builders.
//!
//! Both builders select tasks whose `started_at` falls in a half-open
//! `[start, end)` range. All boundaries and day grouping use UTC; weeks
//! start on Monday at 00:00 UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::Task;

/// CSV header, in contract order
pub const CSV_COLUMNS: [&str; 7] = [
    "identifier",
    "name",
    "status",
    "started_at",
    "finished_at",
    "duration_minutes",
    "notes",
];

const IN_PROGRESS: &str = "in progress";

/// Half-open UTC time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReportRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(Error::Validation(format!(
                "report range end {} must be after start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Range covering whole days `[from, to)`
    pub fn days(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        Self::new(midnight(from), midnight(to))
    }

    /// The Monday-start week containing `date`
    pub fn week_of(date: NaiveDate) -> Result<Self> {
        let out_of_range = || Error::Validation(format!("date {date} out of range"));
        let monday = date
            .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
            .ok_or_else(out_of_range)?;
        let next_monday = monday
            .checked_add_days(Days::new(7))
            .ok_or_else(out_of_range)?;
        Ok(Self {
            start: midnight(monday),
            end: midnight(next_monday),
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Last calendar day that intersects the range
    pub fn last_day(&self) -> NaiveDate {
        (self.end - chrono::Duration::nanoseconds(1)).date_naive()
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Tasks started inside `range`, ascending by start time (stable)
pub fn select<'a>(tasks: &'a [Task], range: &ReportRange) -> Vec<&'a Task> {
    let mut selected: Vec<&Task> = tasks
        .iter()
        .filter(|task| range.contains(task.started_at))
        .collect();
    selected.sort_by_key(|task| task.started_at);
    selected
}

/// Render the weekly Markdown report
pub fn build_weekly_markdown(tasks: &[Task], range: &ReportRange) -> String {
    let mut days: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in select(tasks, range) {
        days.entry(task.started_at.date_naive())
            .or_default()
            .push(task);
    }

    let mut lines = vec![format!(
        "# Weekly report: {} to {}",
        range.start().format("%Y-%m-%d"),
        range.last_day().format("%Y-%m-%d")
    )];

    if days.is_empty() {
        lines.push(String::new());
        lines.push("_No tasks recorded in this period._".to_string());
    }

    for (day, day_tasks) in days {
        lines.push(String::new());
        lines.push(format!("## {}", day.format("%A, %Y-%m-%d")));
        lines.push(String::new());
        for task in day_tasks {
            lines.push(format!(
                "- {} ({})",
                single_line(&task.name),
                describe_duration(task)
            ));
            for segment in task.note_segments() {
                lines.push(format!("  - {}", single_line(segment)));
            }
        }
    }

    let mut document = lines.join("\n");
    document.push('\n');
    document
}

/// Collapse line breaks so text stays inside its bullet
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe_duration(task: &Task) -> String {
    match task.duration_minutes() {
        Some(minutes) => format_minutes(minutes),
        None => IN_PROGRESS.to_string(),
    }
}

/// `45m`, `2h`, `1h 30m`
pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, rest) => format!("{rest}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, rest) => format!("{hours}h {rest}m"),
    }
}

/// One CSV summary row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    pub identifier: String,
    pub name: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: String,
    pub duration_minutes: String,
    pub notes: String,
}

impl CsvRow {
    fn from_task(task: &Task) -> Self {
        Self {
            identifier: task.id.clone(),
            name: task.name.clone(),
            status: task.status.to_string(),
            started_at: format_timestamp(task.started_at),
            finished_at: task.finished_at.map(format_timestamp).unwrap_or_default(),
            duration_minutes: task
                .duration_minutes()
                .map(|minutes| minutes.to_string())
                .unwrap_or_default(),
            notes: task.notes.clone().unwrap_or_default(),
        }
    }

    fn fields(&self) -> [&str; 7] {
        [
            self.identifier.as_str(),
            self.name.as_str(),
            self.status.as_str(),
            self.started_at.as_str(),
            self.finished_at.as_str(),
            self.duration_minutes.as_str(),
            self.notes.as_str(),
        ]
    }
}

/// Tabular weekly summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvSummary {
    pub rows: Vec<CsvRow>,
}

impl CsvSummary {
    /// RFC 4180 text with a header line; every line ends with `\n`
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_record(&mut out, &CSV_COLUMNS);
        for row in &self.rows {
            push_record(&mut out, &row.fields());
        }
        out
    }
}

/// Build the CSV summary for `range`
pub fn build_csv_summary(tasks: &[Task], range: &ReportRange) -> CsvSummary {
    CsvSummary {
        rows: select(tasks, range)
            .into_iter()
            .map(CsvRow::from_task)
            .collect(),
    }
}

fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push('\n');
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date(label: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
        Error::Validation(format!("invalid {label} date '{value}': {err} (expected YYYY-MM-DD)"))
    })
}
