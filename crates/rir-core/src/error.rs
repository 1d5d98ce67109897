//! Dataset error taxonomy

use std::path::Path;

use thiserror::Error;

/// Errors shared by every dataset driver.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Unknown IR identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Corrupt file {path}: {reason}")]
    CorruptFile { path: String, reason: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    /// Corrupt-file error attached to a path.
    pub fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        DatasetError::CorruptFile {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Missing-root error for a path.
    pub fn not_found(path: &Path) -> Self {
        DatasetError::DatasetNotFound(path.display().to_string())
    }
}

/// Result type alias
pub type DatasetResult<T> = Result<T, DatasetError>;
