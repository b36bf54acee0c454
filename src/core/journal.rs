//! Append-only run journal with file-based persistence.
//!
//! Runs are stored as newline-delimited JSON (JSONL) for simplicity
//! and easy debugging/inspection.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::domain::RunRecord;

/// Journal file name inside the state directory
pub const JOURNAL_FILE: &str = "runs.jsonl";

/// File-based run journal using JSONL format
#[derive(Debug, Clone)]
pub struct RunJournal {
    path: PathBuf,
}

impl RunJournal {
    /// Create or open the journal inside a state directory
    pub async fn open(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir)
            .await
            .with_context(|| format!("Failed to create state directory: {}", state_dir.display()))?;

        Ok(Self {
            path: state_dir.join(JOURNAL_FILE),
        })
    }

    /// Get the path to the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record to the journal
    pub async fn append(&self, record: &RunRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open journal: {}", self.path.display()))?;

        let json = serde_json::to_string(record).context("Failed to serialize run record")?;
        file.write_all(format!("{}\n", json).as_bytes())
            .await
            .context("Failed to write run record")?;
        file.flush().await.context("Failed to flush run record")?;

        Ok(())
    }

    /// Replay all records in order
    ///
    /// Lines that do not decode (such as a record cut short by an
    /// interrupted append) are skipped.
    pub async fn replay(&self) -> Result<Vec<RunRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .await
            .with_context(|| format!("Failed to open journal: {}", self.path.display()))?;

        let mut lines = BufReader::new(file).lines();
        let mut records = Vec::new();

        let mut line_number = 0;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RunRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        journal = %self.path.display(),
                        line = line_number,
                        error = %e,
                        "Skipping unreadable run record"
                    );
                }
            }
        }

        Ok(records)
    }

    /// Most recent records first
    pub async fn recent(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let mut records = self.replay().await?;
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

/// Hash source text (first 16 chars of SHA256)
pub fn hash_source(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
