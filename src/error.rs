//! Error types for tasklog
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, lifecycle misuse, unknown task, bad config)
//! - 3: Task store is corrupt (fatal for the session, never auto-repaired)
//! - 4: Operation failed (write failure, other I/O)

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskStatus;

/// Exit codes for the tasklog CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const STORAGE_CORRUPT: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tasklog operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Cannot {action} task {id}: task is already {status}")]
    InvalidTransition {
        id: String,
        status: TaskStatus,
        action: &'static str,
    },

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Fatal for the session (exit code 3)
    #[error("Task store {path} is corrupt: {reason}")]
    StorageCorrupt { path: PathBuf, reason: String },

    // Operation failures (exit code 4)
    #[error("Failed to write {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::InvalidTransition { .. }
            | Error::NotFound(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::StorageCorrupt { .. } => exit_codes::STORAGE_CORRUPT,

            Error::StorageWrite { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Stable message category, one per user-visible error class
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::NotFound(_) => "not_found",
            Error::InvalidConfig(_) => "invalid_config",
            Error::StorageCorrupt { .. } => "storage_corrupt",
            Error::StorageWrite { .. } => "storage_write",
            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) | Error::TomlSerialize(_) => {
                "operation_failed"
            }
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InvalidTransition { id, status, action } => Some(serde_json::json!({
                "id": id,
                "status": status,
                "action": action,
            })),
            Error::NotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::StorageCorrupt { path, reason } => Some(serde_json::json!({
                "path": path,
                "reason": reason,
            })),
            Error::StorageWrite { path, .. } => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for tasklog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
