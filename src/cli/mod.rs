//! Command-line interface for tasklog
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::storage::Storage;

mod init;
mod report;
mod task;

/// tasklog - Task Logger
///
/// Record units of work, track them from start to finish, and build weekly
/// Markdown and CSV summaries.
#[derive(Parser, Debug)]
#[command(name = "tasklog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "TASKLOG_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the data directory and default configuration
    Init,

    /// Start a new task
    Start {
        /// Task name
        name: String,

        /// Notes for the task (separate multiple notes with '|')
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Finish an active task
    Finish {
        /// Task id, unique id prefix, or the name of an active task
        task: String,

        /// Replace the task notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List tasks
    List {
        /// Status filter: active, finished, all
        #[arg(long, default_value = "all")]
        status: String,
    },

    /// Show one task with its notes
    Show {
        /// Task id, unique id prefix, or the name of an active task
        task: String,
    },

    /// Show the most recently active tasks
    Recent {
        /// Maximum entries to show (defaults to report.recent_limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the start/finish history log
    History {
        /// Maximum entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Weekly reports
    #[command(subcommand)]
    Report(ReportCommands),
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Weekly Markdown report
    Markdown(RangeArgs),

    /// Weekly CSV summary
    Csv(RangeArgs),

    /// List exported reports
    Exports,
}

/// Report range and destination
#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Any date (YYYY-MM-DD) inside the Monday-start week to report on
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub week: Option<String>,

    /// First day of a custom range (YYYY-MM-DD, inclusive)
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// End of a custom range (YYYY-MM-DD, exclusive)
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Output file; '-' prints to stdout (defaults to the export directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Resolve the data directory and open storage
fn open_storage(data_dir: Option<PathBuf>) -> Result<Storage> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => Storage::default_data_dir()?,
    };
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");
    Storage::open(data_dir)
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let storage = open_storage(self.data_dir)?;
        let output = crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run(storage, output),
            Commands::Start { name, notes } => {
                task::run_start(storage, task::StartOptions { name, notes }, output)
            }
            Commands::Finish { task, notes } => {
                task::run_finish(storage, task::FinishOptions { task, notes }, output)
            }
            Commands::List { status } => task::run_list(storage, &status, output),
            Commands::Show { task } => task::run_show(storage, &task, output),
            Commands::Recent { limit } => task::run_recent(storage, limit, output),
            Commands::History { limit } => task::run_history(storage, limit, output),
            Commands::Report(cmd) => match cmd {
                ReportCommands::Markdown(range) => {
                    report::run_build(storage, report::ReportFormat::Markdown, range, output)
                }
                ReportCommands::Csv(range) => {
                    report::run_build(storage, report::ReportFormat::Csv, range, output)
                }
                ReportCommands::Exports => report::run_exports(storage, output),
            },
        }
    }
}
