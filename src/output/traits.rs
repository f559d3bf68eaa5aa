//! Output handler traits and errors

use crate::comic::ComicRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for crawl result sinks
pub trait OutputHandler {
    /// Writes the complete, already sorted crawl result
    fn write_comics(&mut self, comics: &[ComicRecord]) -> OutputResult<()>;
}
