//! ResultWriter - rotating, capped NDJSON result files
//!
//! Output state lives on disk, not in memory: every save re-discovers the
//! current file by scanning the filename sequence and counting lines. Files
//! are appended to until they hold `MAX_RECORDS_PER_FILE` lines, then the
//! next suffix in the sequence takes over.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::record::Record;

/// Cap on records (lines) per output file
pub const MAX_RECORDS_PER_FILE: usize = 100;

/// Appends batches of records to capped, rotating NDJSON files
pub struct ResultWriter {
    dir: PathBuf,
    base: String,
}

impl ResultWriter {
    /// Create a writer rooted at `dir` with the given base filename
    pub fn new(dir: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base: base.into(),
        }
    }

    /// Path of the nth file in the rotation sequence (1-based).
    ///
    /// The first file carries no numeric suffix: `res.txt`, `res2.txt`,
    /// `res3.txt`, ...
    fn candidate_path(&self, file_num: usize) -> PathBuf {
        let name = if file_num == 1 {
            format!("{}.txt", self.base)
        } else {
            format!("{}{}.txt", self.base, file_num)
        };
        self.dir.join(name)
    }

    /// Find the file the next append should target.
    ///
    /// Scans suffixes from 1 upward: the first path that does not exist
    /// (count 0) or holds fewer than `MAX_RECORDS_PER_FILE` lines wins.
    /// The scan is the sole source of truth for where to write next;
    /// nothing is cached between calls.
    pub async fn locate_writable_file(&self) -> Result<(PathBuf, usize)> {
        let mut file_num = 1;
        loop {
            let path = self.candidate_path(file_num);

            if !path.exists() {
                return Ok((path, 0));
            }

            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let lines = content.lines().count();

            if lines < MAX_RECORDS_PER_FILE {
                return Ok((path, lines));
            }

            file_num += 1;
        }
    }

    /// Append records, rotating across the file cap.
    ///
    /// Fills the current file up to the cap in input order, then writes any
    /// leftover to the next file in the sequence. Returns the last path
    /// written to: the current file when everything fit, the overflow file
    /// otherwise.
    ///
    /// The leftover is assumed to fit in one fresh file, which holds while
    /// a batch never exceeds `MAX_RECORDS_PER_FILE` records; a larger
    /// leftover would be appended past the cap without a further rotation.
    pub async fn save(&self, records: &[Record]) -> Result<PathBuf> {
        let (current, count) = self.locate_writable_file().await?;

        let space = MAX_RECORDS_PER_FILE - count;
        let (head, leftover) = records.split_at(records.len().min(space));

        if !head.is_empty() {
            self.append(&current, head).await?;
        }

        if !leftover.is_empty() {
            // The current file just reached the cap, so the rescan lands on
            // a fresh path.
            let (next, _) = self.locate_writable_file().await?;
            self.append(&next, leftover).await?;
            return Ok(next);
        }

        Ok(current)
    }

    /// Append records to `path` as JSON lines, creating it if needed
    async fn append(&self, path: &Path, records: &[Record]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", self.dir.display()))?;

        let mut lines = String::new();
        for record in records {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;

        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %path.display(), appended = records.len(), "records written");
        Ok(())
    }
}
