//! Error types for the incan-core library.

use thiserror::Error;

/// Errors surfaced at the edges of the pipeline (reading and decoding
/// extraction documents). The in-memory pipeline itself never fails on
/// malformed content; degradation there is field-scoped.
#[derive(Error, Debug)]
pub enum IncanError {
    /// The extraction document is not valid JSON.
    #[error("failed to decode extraction document: {0}")]
    Document(#[from] serde_json::Error),

    /// I/O error reading a document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the incan library.
pub type Result<T> = std::result::Result<T, IncanError>;
