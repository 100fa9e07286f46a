#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tasklog::store::TaskSnapshot;
use tasklog::task::{self, StartRequest, Task};
use tempfile::TempDir;

pub struct TestDataDir {
    dir: TempDir,
}

impl TestDataDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.dir.path().join("tasks.json")
    }

    pub fn history_file(&self) -> PathBuf {
        self.dir.path().join("task_history.jsonl")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.dir.path().join("exports")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("tasklog.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    /// Write a snapshot directly, bypassing the CLI clock
    pub fn seed_tasks(&self, tasks: Vec<Task>) {
        let snapshot = TaskSnapshot::new(tasks);
        let body = serde_json::to_string_pretty(&snapshot).expect("snapshot json");
        fs::write(self.tasks_file(), body).expect("write tasks");
    }

    pub fn read_tasks_raw(&self) -> String {
        fs::read_to_string(self.tasks_file()).expect("read tasks")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = tasklog_cmd();
        cmd.arg("--data-dir").arg(self.path());
        cmd
    }

    /// Run with `--json` and parse the envelope from stdout
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&output).expect("json envelope")
    }
}

pub fn tasklog_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tasklog").expect("binary");
    cmd.env_remove("TASKLOG_DIR").env_remove("RUST_LOG");
    cmd
}

/// Finished task started on 2025-01-`day` at `hour:minute` UTC
pub fn finished_task(
    name: &str,
    notes: Option<&str>,
    day: u32,
    start: (u32, u32),
    end: (u32, u32),
) -> Task {
    let started_at = Utc.with_ymd_and_hms(2025, 1, day, start.0, start.1, 0).unwrap();
    let finished_at = Utc.with_ymd_and_hms(2025, 1, day, end.0, end.1, 0).unwrap();
    let mut request = StartRequest::new(name);
    if let Some(notes) = notes {
        request = request.with_notes(notes);
    }
    let active = task::start(request, started_at).expect("start");
    task::finish(&active, None, finished_at).expect("finish")
}

pub fn active_task(name: &str, day: u32, start: (u32, u32)) -> Task {
    let started_at = Utc.with_ymd_and_hms(2025, 1, day, start.0, start.1, 0).unwrap();
    task::start(StartRequest::new(name), started_at).expect("start")
}
