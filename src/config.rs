//! Configuration loading and management
//!
//! Handles parsing of `tasklog.toml` in the data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::storage::CONFIG_FILE;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Task store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Activity history configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Report configuration
    #[serde(default)]
    pub report: ReportConfig,
}

/// Task store configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backing file name, relative to the data directory
    #[serde(default = "default_tasks_file")]
    pub file: String,

    /// Copy the previous snapshot to `<file>.bak` before each save
    #[serde(default = "default_true")]
    pub backup: bool,
}

fn default_tasks_file() -> String {
    "tasks.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: default_tasks_file(),
            backup: default_true(),
        }
    }
}

/// Activity history configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// History file name, relative to the data directory
    #[serde(default = "default_history_file")]
    pub file: String,
}

fn default_history_file() -> String {
    "task_history.jsonl".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            file: default_history_file(),
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    /// Export directory; relative paths resolve against the data directory
    #[serde(default = "default_export_dir")]
    pub export_dir: String,

    /// Default number of entries for `tasklog recent`
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_export_dir() -> String {
    "exports".to_string()
}

fn default_recent_limit() -> usize {
    25
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            recent_limit: default_recent_limit(),
        }
    }
}

impl Config {
    /// Load configuration from a `tasklog.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a data directory
    ///
    /// A missing `tasklog.toml` means defaults. A file that cannot be read,
    /// parsed or validated is an `InvalidConfig` error.
    pub fn load_from_dir(data_dir: &Path) -> crate::error::Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load(&config_path).map_err(|err| match err {
            crate::error::Error::InvalidConfig(reason) => crate::error::Error::InvalidConfig(
                format!("{}: {reason}", config_path.display()),
            ),
            other => crate::error::Error::InvalidConfig(format!(
                "{}: {other}",
                config_path.display()
            )),
        })
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        crate::storage::write_atomic(path, content.as_bytes())
    }

    fn validate(&self) -> crate::error::Result<()> {
        validate_file_name(&self.storage.file, "storage.file")?;
        validate_file_name(&self.history.file, "history.file")?;

        if self.storage.file.trim() == self.history.file.trim() {
            return Err(crate::error::Error::InvalidConfig(
                "storage.file and history.file must differ".to_string(),
            ));
        }

        if self.report.export_dir.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "report.export_dir cannot be empty".to_string(),
            ));
        }

        if self.report.recent_limit == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "report.recent_limit must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_file_name(value: &str, field: &str) -> crate::error::Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field} cannot be empty"
        )));
    }
    if trimmed != value {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field} '{value}' has surrounding whitespace"
        )));
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field} '{value}' must be a plain file name"
        )));
    }
    if trimmed == CONFIG_FILE {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field} cannot be {CONFIG_FILE}"
        )));
    }
    Ok(())
}
