//! Idempotent Writer
//!
//! Persists generated text only when it differs from what is already on disk,
//! so unchanged units keep their modification time and downstream incremental
//! builds do not recompile them. After a write the file is read back until its
//! content is visible, with a bounded number of polls.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

/// Write errors.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("content of {path} not confirmed after {attempts} polls")]
    Unconfirmed { path: PathBuf, attempts: u32 },
}

/// Result type for write operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Polling behaviour of the writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Delay between read-back attempts
    pub poll_interval: Duration,
    /// Read-back attempts before giving up
    pub max_polls: u32,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            max_polls: 500, // ~5s
        }
    }
}

/// What the writer did for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file already held the desired content
    Unchanged,
    /// The content was written and confirmed
    Written,
}

/// Counters over all calls of one writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub written: usize,
    pub unchanged: usize,
}

/// Change-aware file writer.
#[derive(Debug, Default)]
pub struct IdempotentWriter {
    config: WriterConfig,
    stats: WriteStats,
}

impl IdempotentWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self {
            config,
            stats: WriteStats::default(),
        }
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    /// Make the file at `path` contain exactly `content`.
    pub fn update(&mut self, path: &Path, content: &str) -> WriteResult<WriteOutcome> {
        if matches!(read_existing(path), Some(existing) if existing == content) {
            trace!(path = %path.display(), "unchanged");
            self.stats.unchanged += 1;
            return Ok(WriteOutcome::Unchanged);
        }

        write_synced(path, content).map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.confirm(path, content)?;

        debug!(path = %path.display(), bytes = content.len(), "wrote");
        self.stats.written += 1;
        Ok(WriteOutcome::Written)
    }

    fn confirm(&self, path: &Path, content: &str) -> WriteResult<()> {
        for attempt in 0..self.config.max_polls {
            if matches!(read_existing(path), Some(actual) if actual == content) {
                return Ok(());
            }
            trace!(path = %path.display(), attempt, "waiting for write to become visible");
            thread::sleep(self.config.poll_interval);
        }
        Err(WriteError::Unconfirmed {
            path: path.to_path_buf(),
            attempts: self.config.max_polls,
        })
    }
}

fn read_existing(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn write_synced(path: &Path, content: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    file.sync_all()
}
