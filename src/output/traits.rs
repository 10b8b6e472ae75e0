//! Output handler traits and errors
//!
//! The crawl only needs one capability from its persistence sink: write the
//! final snapshot once, after every branch has settled.

use crate::state::CrawlSnapshot;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A sink for the final crawl snapshot
pub trait SnapshotWriter {
    /// Persists the snapshot
    fn write_snapshot(&self, snapshot: &CrawlSnapshot) -> OutputResult<()>;
}
