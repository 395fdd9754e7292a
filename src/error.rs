//! Error taxonomy shared by the document model, persistence and editor.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::TimeField;

/// Errors raised while loading, editing or saving a notification document.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The file could not be read or written.
    #[error("I/O error on {}: {error}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// The underlying I/O error.
        error: std::io::Error,
    },

    /// The document is not valid JSON or has a field of the wrong type.
    #[error("invalid notification file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document could not be encoded back to JSON.
    #[error("failed to encode notification file: {0}")]
    Encode(serde_json::Error),

    /// An operation referenced a notification that does not exist.
    #[error("no notification at index {index} (list has {len})")]
    Index { index: usize, len: usize },

    /// A time field is outside its allowed range.
    #[error("{field} must be between 0 and {max}, got {value}")]
    Validation { field: TimeField, value: u32, max: u32 },

    /// Plain save was requested before any file was opened or saved.
    #[error("no file chosen yet, use save as")]
    NoPath,
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
