//! Types for the engine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};

/// What the engine is asked to do: read `input`, write `output`.
///
/// The output container is inferred by the engine from the output file's
/// extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Input file path.
    pub input_path: PathBuf,
    /// Output file path.
    pub output_path: PathBuf,
}

impl CommandSpec {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }
}

/// Periodic statistics emitted while a command runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSample {
    /// Position reached in the input, in seconds.
    pub elapsed_secs: f64,
    /// Current processing speed (e.g., "1.5x").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
}

/// Terminal state reported once per submitted command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineOutcome {
    /// The output file was written.
    Completed,
    /// The engine gave up.
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// The command was aborted through [`Engine::cancel`](super::Engine::cancel).
    Cancelled,
    /// The command ended in a way the engine could not classify
    /// (e.g. killed by an outside signal).
    Unknown,
}

/// Handle to a submitted command.
///
/// Progress samples arrive zero or more times on `progress`; exactly one
/// outcome arrives on `completion`. A dropped completion sender means the
/// engine lost track of the command.
#[derive(Debug)]
pub struct EngineHandle {
    /// Engine-assigned identifier of the command.
    pub id: u64,
    pub progress: mpsc::Receiver<ProgressSample>,
    pub completion: oneshot::Receiver<EngineOutcome>,
}

/// Information about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// File path.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Container format (e.g., "matroska", "mov").
    pub format: String,
    /// Video codec (if present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    /// Video width (if present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_width: Option<u32>,
    /// Video height (if present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_height: Option<u32>,
    /// Audio codec (if present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
}
