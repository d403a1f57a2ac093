use std::path::PathBuf;
use std::time::Duration;

use claimdesk_core::error::CoreError;

/// Errors from file-backed storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The durable write of a record file failed. The submission was not saved.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The durable write did not finish in time. The submission may not be saved.
    #[error("Write to {} did not complete within {}s", path.display(), after.as_secs())]
    WriteTimeout { path: PathBuf, after: Duration },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt record in {} at line {line}: {message}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),

    /// The record or annotator id was rejected before touching disk.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StorageError {
    /// Whether the primary durable write failed (and may be retried).
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::WriteTimeout { .. })
    }
}
