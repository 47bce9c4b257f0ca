//! Types for the conversion orchestrator.

use thiserror::Error;

use crate::engine::EngineError;
use crate::picker::PickerError;
use crate::staging::StagingError;

/// Shown when converting without a picked file.
pub const MSG_MISSING_INPUT: &str = "A file must be chosen!";
/// Shown when converting without a chosen output type.
pub const MSG_MISSING_FORMAT: &str = "An output type must be chosen!";
/// Shown when the engine reports a failure.
pub const MSG_FAILED: &str = "Conversion failed!";
/// Shown when a run is stopped before finishing.
pub const MSG_STOPPED: &str = "Conversion stopped!";

/// Builds the notice shown after a successful conversion.
pub fn success_message(destination: &std::path::Path) -> String {
    format!(
        "Conversion finished successfully! File saved as {}",
        destination.display()
    )
}

/// Errors that can occur during orchestration.
///
/// Every error is also written to the session's message slot, so the
/// `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No input file was picked.
    #[error("A file must be chosen!")]
    MissingInput,

    /// No output format was chosen.
    #[error("An output type must be chosen!")]
    MissingFormat,

    /// A conversion is already in flight.
    #[error("A conversion is already in progress")]
    Busy,

    /// The attempt was cancelled before the engine took over.
    #[error("Conversion stopped!")]
    Cancelled,

    /// Copying the input to scratch storage failed.
    #[error("Staging failed: {0}")]
    Staging(#[from] StagingError),

    /// The engine refused the command.
    #[error("{0}")]
    Submission(#[from] EngineError),

    /// Picking an input failed.
    #[error("{0}")]
    Picker(#[from] PickerError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_validation_messages_are_distinct() {
        assert_eq!(OrchestratorError::MissingInput.to_string(), MSG_MISSING_INPUT);
        assert_eq!(OrchestratorError::MissingFormat.to_string(), MSG_MISSING_FORMAT);
        assert_ne!(MSG_MISSING_INPUT, MSG_MISSING_FORMAT);
        assert_eq!(OrchestratorError::Cancelled.to_string(), MSG_STOPPED);
    }

    #[test]
    fn test_submission_error_keeps_detail() {
        let err = OrchestratorError::from(EngineError::FfmpegNotFound {
            path: PathBuf::from("/opt/ffmpeg"),
        });
        assert_eq!(err.to_string(), "FFmpeg not found at path: /opt/ffmpeg");
    }

    #[test]
    fn test_success_message_names_destination() {
        let msg = success_message(Path::new("/videos/videology-2024-01-01-10-00-00.mkv"));
        assert!(msg.ends_with("/videos/videology-2024-01-01-10-00-00.mkv"));
    }
}
