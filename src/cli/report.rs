//! tasklog report command implementations.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::RangeArgs;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::report::{self, ReportRange};
use crate::storage::{self, Storage};
use crate::store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Csv,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Csv => "csv",
        }
    }

    fn command(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "report markdown",
            ReportFormat::Csv => "report csv",
        }
    }
}

#[derive(Serialize)]
struct ReportWritten {
    format: &'static str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tasks: usize,
    path: PathBuf,
}

#[derive(Serialize)]
struct ExportEntry {
    name: String,
    path: PathBuf,
    bytes: u64,
}

#[derive(Serialize)]
struct ExportList {
    export_dir: PathBuf,
    total: usize,
    exports: Vec<ExportEntry>,
}

pub fn run_build(
    storage: Storage,
    format: ReportFormat,
    args: RangeArgs,
    output: OutputOptions,
) -> Result<()> {
    let range = resolve_range(&args, Utc::now())?;
    let store = TaskStore::open(storage)?;
    let tasks = store.tasks();
    let selected = report::select(tasks, &range).len();

    let document = match format {
        ReportFormat::Markdown => report::build_weekly_markdown(tasks, &range),
        ReportFormat::Csv => report::build_csv_summary(tasks, &range).to_csv(),
    };

    if args.output.as_deref() == Some(Path::new("-")) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    let path = match args.output {
        Some(path) => path,
        None => default_export_path(store.storage(), &range, format),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::StorageWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    storage::write_atomic(&path, document.as_bytes())?;
    tracing::debug!(path = %path.display(), tasks = selected, "report written");

    let written = ReportWritten {
        format: format.extension(),
        start: range.start(),
        end: range.end(),
        tasks: selected,
        path,
    };

    let mut human = HumanOutput::new("Report written");
    human.push_summary("Path", written.path.display().to_string());
    human.push_summary(
        "Range",
        format!(
            "{} to {}",
            range.start().format("%Y-%m-%d"),
            range.last_day().format("%Y-%m-%d")
        ),
    );
    human.push_summary("Tasks", selected.to_string());

    emit_success(output, format.command(), &written, &human)
}

pub fn run_exports(storage: Storage, output: OutputOptions) -> Result<()> {
    let export_dir = storage.export_dir();
    let mut exports = Vec::new();

    if export_dir.is_dir() {
        for entry in fs::read_dir(&export_dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_report = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "md" || ext == "csv")
                .unwrap_or(false);
            if !is_report || !path.is_file() {
                continue;
            }
            exports.push(ExportEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                bytes: entry.metadata()?.len(),
                path,
            });
        }
    }
    exports.sort_by(|a, b| a.name.cmp(&b.name));

    let mut human = HumanOutput::new("Exported reports");
    human.push_summary("Directory", export_dir.display().to_string());
    human.push_summary("Total", exports.len().to_string());
    for export in &exports {
        human.push_detail(format!("{} ({} bytes)", export.name, export.bytes));
    }

    emit_success(
        output,
        "report exports",
        &ExportList {
            export_dir,
            total: exports.len(),
            exports,
        },
        &human,
    )
}

/// `--week`, `--from/--to`, or the week containing `now`
fn resolve_range(args: &RangeArgs, now: DateTime<Utc>) -> Result<ReportRange> {
    match (&args.week, &args.from, &args.to) {
        (Some(week), _, _) => ReportRange::week_of(report::parse_date("--week", week)?),
        (None, Some(from), Some(to)) => ReportRange::days(
            report::parse_date("--from", from)?,
            report::parse_date("--to", to)?,
        ),
        (None, None, None) => ReportRange::week_of(now.date_naive()),
        _ => Err(Error::Validation(
            "--from and --to must be given together".to_string(),
        )),
    }
}

fn default_export_path(storage: &Storage, range: &ReportRange, format: ReportFormat) -> PathBuf {
    storage.export_dir().join(format!(
        "{}_weekly_summary.{}",
        range.start().format("%Y-%m-%d"),
        format.extension()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn args(week: Option<&str>, from: Option<&str>, to: Option<&str>) -> RangeArgs {
        RangeArgs {
            week: week.map(str::to_string),
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            output: None,
        }
    }

    #[test]
    fn defaults_to_current_week() {
        // Thursday
        let now = Utc.with_ymd_and_hms(2025, 1, 9, 15, 0, 0).unwrap();
        let range = resolve_range(&args(None, None, None), now).unwrap();
        assert_eq!(range.start(), Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap());
        assert_eq!(range.end(), Utc.with_ymd_and_hms(2025, 1, 13, 0, 0, 0).unwrap());
    }

    #[test]
    fn custom_range_rejects_inverted_dates() {
        let now = Utc::now();
        let err = resolve_range(&args(None, Some("2025-01-10"), Some("2025-01-06")), now)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = resolve_range(&args(None, Some("2025-01-06"), None), now).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn week_near_last_date_is_rejected() {
        let last = chrono::NaiveDate::MAX.format("%Y-%m-%d").to_string();
        let err = resolve_range(&args(Some(&last), None, None), Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn default_path_uses_week_start() {
        let storage = Storage::new(PathBuf::from("/data"), crate::config::Config::default());
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let range = ReportRange::week_of(date).unwrap();
        assert_eq!(
            default_export_path(&storage, &range, ReportFormat::Csv),
            PathBuf::from("/data/exports/2025-01-06_weekly_summary.csv")
        );
    }
}
