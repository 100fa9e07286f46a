mod support;

use std::fs;

use predicates::prelude::*;
use predicates::str::contains;

use support::{active_task, finished_task, TestDataDir};

fn seed_week(data: &TestDataDir) {
    data.seed_tasks(vec![
        finished_task("Write spec", Some("outline|first draft"), 6, (9, 0), (10, 30)),
        finished_task("Review PR", None, 7, (14, 0), (14, 45)),
        active_task("Plan sprint", 8, (8, 0)),
        // Following Monday, outside the week
        finished_task("Retro", None, 13, (0, 0), (1, 0)),
    ]);
}

#[test]
fn markdown_report_to_stdout() {
    let data = TestDataDir::new();
    seed_week(&data);

    data.cmd()
        .args(["report", "markdown", "--week", "2025-01-08", "--output", "-"])
        .assert()
        .success()
        .stdout(contains("# Weekly report: 2025-01-06 to 2025-01-12"))
        .stdout(contains("## Monday, 2025-01-06"))
        .stdout(contains("- Write spec (1h 30m)"))
        .stdout(contains("  - first draft"))
        .stdout(contains("## Tuesday, 2025-01-07"))
        .stdout(contains("- Review PR (45m)"))
        .stdout(contains("- Plan sprint (in progress)"))
        .stdout(contains("Retro").not());
}

#[test]
fn empty_week_renders_placeholder() {
    let data = TestDataDir::new();
    seed_week(&data);

    data.cmd()
        .args(["report", "markdown", "--week", "2024-12-30", "--output", "-"])
        .assert()
        .success()
        .stdout(contains("_No tasks recorded in this period._"))
        .stdout(contains("##").not());
}

#[test]
fn csv_report_written_to_default_export_path() {
    let data = TestDataDir::new();
    seed_week(&data);

    let value = data.json(&["report", "csv", "--week", "2025-01-06"]);
    assert_eq!(value["command"], "report csv");
    assert_eq!(value["data"]["tasks"], 3);

    let path = data.export_dir().join("2025-01-06_weekly_summary.csv");
    let csv = fs::read_to_string(&path).expect("csv export");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "identifier,name,status,started_at,finished_at,duration_minutes,notes"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains(",Write spec,finished,2025-01-06T09:00:00Z,2025-01-06T10:30:00Z,90,outline|first draft"));
    assert!(lines[3].ends_with(",Plan sprint,active,2025-01-08T08:00:00Z,,,"));
}

#[test]
fn custom_range_is_half_open() {
    let data = TestDataDir::new();
    seed_week(&data);

    data.cmd()
        .args([
            "report", "csv", "--from", "2025-01-07", "--to", "2025-01-08", "--output", "-",
        ])
        .assert()
        .success()
        .stdout(contains("Review PR"))
        .stdout(contains("Write spec").not())
        .stdout(contains("Plan sprint").not());
}

#[test]
fn inverted_range_is_rejected() {
    let data = TestDataDir::new();

    data.cmd()
        .args(["report", "markdown", "--from", "2025-01-08", "--to", "2025-01-06"])
        .assert()
        .code(2);
}

#[test]
fn bad_date_is_rejected() {
    let data = TestDataDir::new();

    data.cmd()
        .args(["report", "csv", "--week", "06/01/2025"])
        .assert()
        .code(2)
        .stderr(contains("YYYY-MM-DD"));
}

#[test]
fn week_past_last_representable_date_is_rejected() {
    let data = TestDataDir::new();

    data.cmd()
        .args(["report", "markdown", "--week=+262142-12-31", "--output", "-"])
        .assert()
        .code(2)
        .stderr(contains("out of range"));
}

#[test]
fn exports_lists_written_reports() {
    let data = TestDataDir::new();
    seed_week(&data);
    data.cmd()
        .args(["report", "markdown", "--week", "2025-01-06"])
        .assert()
        .success();
    data.cmd()
        .args(["report", "csv", "--week", "2025-01-06"])
        .assert()
        .success();

    let value = data.json(&["report", "exports"]);
    assert_eq!(value["data"]["total"], 2);
    assert_eq!(
        value["data"]["exports"][0]["name"],
        "2025-01-06_weekly_summary.csv"
    );
    assert_eq!(
        value["data"]["exports"][1]["name"],
        "2025-01-06_weekly_summary.md"
    );
}

#[test]
fn explicit_output_path_is_created() {
    let data = TestDataDir::new();
    seed_week(&data);
    let target = data.path().join("out").join("week.md");

    data.cmd()
        .args(["report", "markdown", "--week", "2025-01-06", "--output"])
        .arg(&target)
        .assert()
        .success();

    let body = fs::read_to_string(&target).expect("report");
    assert!(body.ends_with('\n'));
    assert!(body.contains("Write spec"));
}
