//! tasklog init command implementation
//!
//! Creates the data directory, a default `tasklog.toml`, an empty task store
//! and the export directory. Running it again leaves existing files alone.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::Storage;
use crate::store::TaskStore;

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    export_dir: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    data_dir: bool,
    config: bool,
    store: bool,
    export_dir: bool,
}

pub fn run(storage: Storage, output: OutputOptions) -> Result<()> {
    let created_data_dir = !storage.data_dir().exists();
    let created_export_dir = !storage.export_dir().exists();
    storage.init()?;

    let created_config = if storage.is_initialized() {
        false
    } else {
        Config::default().save(&storage.config_file())?;
        true
    };

    let created_store = if storage.tasks_file().exists() {
        false
    } else {
        TaskStore::open(storage.clone())?.save(&[])?;
        true
    };

    let report = InitReport {
        data_dir: storage.data_dir().to_path_buf(),
        export_dir: storage.export_dir(),
        created: InitCreated {
            data_dir: created_data_dir,
            config: created_config,
            store: created_store,
            export_dir: created_export_dir,
        },
    };

    let mut created_items = Vec::new();
    if created_data_dir {
        created_items.push("data directory");
    }
    if created_config {
        created_items.push(crate::storage::CONFIG_FILE);
    }
    if created_store {
        created_items.push("task store");
    }
    if created_export_dir {
        created_items.push("exports directory");
    }

    let header = if created_items.is_empty() {
        "tasklog already initialized".to_string()
    } else {
        format!("tasklog initialized (created {})", created_items.join(", "))
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("Data dir", report.data_dir.display().to_string());
    human.push_summary("Exports", report.export_dir.display().to_string());
    human.push_next_step("tasklog start \"<task name>\"");

    emit_success(output, "init", &report, &human)
}
