//! Storage layer for tasklog
//!
//! All persistent state lives in a single data directory:
//!
//! ```text
//! <data-dir>/
//!   tasklog.toml              # Configuration
//!   tasks.json                # Task store snapshot (backing file)
//!   tasks.json.bak            # Previous snapshot, written before each save
//!   task_history.jsonl        # Start/finish activity log
//!   exports/                  # Default destination for reports
//!     <date>_weekly_summary.md
//!     <date>_weekly_summary.csv
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::error::{Error, Result};

/// Name of the configuration file inside the data directory
pub const CONFIG_FILE: &str = "tasklog.toml";

/// Storage manager for tasklog state
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
    config: Config,
}

impl Storage {
    pub fn new(data_dir: PathBuf, config: Config) -> Self {
        Self { data_dir, config }
    }

    /// Open storage rooted at `data_dir`, reading its `tasklog.toml` if any
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        let config = Config::load_from_dir(&data_dir)?;
        Ok(Self::new(data_dir, config))
    }

    /// Platform data directory, e.g. `~/.local/share/tasklog` on Linux
    pub fn default_data_dir() -> Result<PathBuf> {
        ProjectDirs::from("", "", "tasklog")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "could not determine a home directory; pass --data-dir".to_string(),
                )
            })
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// Path to the task store backing file
    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir.join(&self.config.storage.file)
    }

    /// Path to the backup written before each save
    pub fn backup_file(&self) -> PathBuf {
        let mut name = self.tasks_file().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join(&self.config.history.file)
    }

    /// Directory for exported reports
    pub fn export_dir(&self) -> PathBuf {
        let configured = Path::new(&self.config.report.export_dir);
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.data_dir.join(configured)
        }
    }

    // =========================================================================
    // Directory initialization
    // =========================================================================

    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.export_dir())?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file().exists()
    }

    // =========================================================================
    // File I/O helpers (atomic writes for safety)
    // =========================================================================

    /// Write JSON data atomically (write to temp, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let mut json = serde_json::to_string_pretty(data)?;
        json.push('\n');
        self.write_atomic(path, json.as_bytes())
    }

    /// Write data atomically using a temp file in the same directory + rename
    ///
    /// Readers see either the old file or the complete new one. Any failure
    /// is reported as `StorageWrite` for `path`, and the temp file is
    /// removed when it is dropped.
    pub fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        write_atomic(path, data)
    }

    /// Copy `path` to `backup` if `path` exists
    pub fn backup(&self, path: &Path, backup: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::copy(path, backup).map_err(|source| Error::StorageWrite {
            path: backup.to_path_buf(),
            source,
        })?;
        Ok(true)
    }

    /// Append a line to a JSONL file
    ///
    /// Not atomic; a crash can leave a truncated last line, which
    /// `read_jsonl` skips.
    pub fn append_jsonl<T: Serialize>(&self, path: &Path, record: &T) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{}", json)?;
            file.sync_all()
        };
        write().map_err(|source| Error::StorageWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read all records from a JSONL file, skipping blank or unparseable lines
    pub fn read_jsonl<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(path = %path.display(), line = index + 1, %err, "skipping unreadable line");
                }
            }
        }

        Ok(records)
    }
}

/// Atomic write of `data` to `path` (temp file in the same directory, fsync, rename)
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|err| err.error)?;
        Ok(())
    };

    write().map_err(|source| Error::StorageWrite {
        path: path.to_path_buf(),
        source,
    })
}
