//! Durable audit trail for tool invocations
//!
//! Appends one JSON line per [`AuditRecord`] to a file. Records already carry
//! scrubbed, truncated error text by the time they reach the sink.

use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::domain::errors::AuditError;
use crate::domain::models::AuditRecord;
use crate::domain::ports::AuditSink;

/// Append-only JSON lines audit sink
#[derive(Clone)]
pub struct FileAuditSink {
    path: PathBuf,
    log_file: Arc<Mutex<File>>,
}

impl FileAuditSink {
    /// Open `log_path` for appending, creating parent directories as needed
    pub async fn new(log_path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let log_path = log_path.as_ref();

        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            path: log_path.to_path_buf(),
            log_file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, skipping lines that do not parse.
    pub fn read_all(&self) -> Result<Vec<AuditRecord>, AuditError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => debug!(error = %e, "Skipping unreadable audit line"),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let json = serde_json::to_string(record)?;

        let mut file = self
            .log_file
            .lock()
            .map_err(|e| AuditError::Unavailable(format!("audit log mutex poisoned: {e}")))?;
        writeln!(file, "{json}")?;
        file.flush()?;

        Ok(())
    }
}

impl std::fmt::Debug for FileAuditSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAuditSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
