//! Output sink traits and types

use crate::extract::Record;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for extracted records
///
/// Sinks own their files; size-based rotation is internal and invisible to
/// callers.
pub trait RecordSink {
    /// Appends a batch of records. Empty batches are a no-op.
    fn write(&mut self, records: &[Record]) -> OutputResult<()>;

    /// Flushes and closes the sink
    fn close(self) -> OutputResult<()>
    where
        Self: Sized;
}
