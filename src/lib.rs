//! tasklog - Task Logger Library
//!
//! This library provides the core functionality for the tasklog CLI tool:
//! recording units of work, moving them from active to finished, and
//! producing weekly summaries.
//!
//! # Core Concepts
//!
//! - **Tasks**: Named units of work with a start time, optional notes, and a
//!   finish time once completed
//! - **Task Store**: Durable collection of tasks backed by a JSON snapshot
//! - **Reports**: Weekly Markdown and CSV summaries over a half-open range
//! - **History**: Append-only start/finish activity log
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `tasklog.toml`
//! - `error`: Error types and result aliases
//! - `task`: Task record and lifecycle transitions
//! - `store`: Task store with validated append/update/query
//! - `report`: Weekly Markdown and CSV builders
//! - `history`: Activity log
//! - `storage`: Data directory layout and atomic file I/O
//! - `output`: Human and JSON output envelopes

pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod output;
pub mod report;
pub mod storage;
pub mod store;
pub mod task;

pub use error::{Error, Result};
