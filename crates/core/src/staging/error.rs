//! Error types for the staging module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while staging an input file.
#[derive(Debug, Error)]
pub enum StagingError {
    /// Source file not found.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The input has no usable file name.
    #[error("Input has no file name: {path}")]
    MissingFileName { path: PathBuf },

    /// Failed to create the scratch directory.
    #[error("Failed to create scratch directory {path}: {error}")]
    ScratchDirFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to copy file.
    #[error("Failed to copy file from {from} to {to}: {error}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StagingError {
    /// Creates a copy failed error.
    pub fn copy_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed { from, to, error }
    }
}
