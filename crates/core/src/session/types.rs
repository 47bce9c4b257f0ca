//! Session types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::format::TargetFormat;

/// A video file chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedInput {
    /// Location of the file.
    pub path: PathBuf,
    /// Name shown to the user.
    pub display_name: String,
}

impl SelectedInput {
    /// Creates an input whose display name is the path's file name.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, display_name }
    }

    /// Creates an input with an explicit display name.
    pub fn with_display_name(path: impl Into<PathBuf>, display_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
        }
    }

    /// File name component used when the input is copied elsewhere.
    ///
    /// Prefers the display name, stripped of any directory parts, and falls
    /// back to the path's own file name.
    pub fn file_name(&self) -> Option<String> {
        Path::new(&self.display_name)
            .file_name()
            .or_else(|| self.path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Where a conversion attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Nothing has been attempted yet.
    #[default]
    Idle,
    /// Selections are being checked.
    Validating,
    /// The input is being copied to scratch storage.
    Staging,
    /// The engine is converting.
    Running,
    /// The engine finished and the output file exists.
    Succeeded,
    /// Staging or the engine failed.
    Failed,
    /// The run was stopped before finishing.
    Cancelled,
}

impl SessionStatus {
    /// Whether a conversion is in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Validating | Self::Staging | Self::Running)
    }

    /// Whether this is one of the end states of an attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Staging => "staging",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The user-facing message slot. Holds at most one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Message {
    Error(String),
    Success(String),
}

impl Message {
    pub fn text(&self) -> &str {
        match self {
            Self::Error(text) | Self::Success(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// State of the current (or most recent) conversion attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionSession {
    /// Number of the attempt this state belongs to. Bumped each time a
    /// conversion passes validation.
    pub attempt: u64,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_input: Option<SelectedInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_format: Option<TargetFormat>,
    /// Duration of the selected input in seconds, 0 when unknown.
    pub input_duration_secs: f64,
    /// Generated output file name, including the extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file_name: Option<String>,
    /// Full destination path of the output file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Progress ratio in `[0, 1]`.
    pub progress: f64,
    pub in_progress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl ConversionSession {
    /// Replaces the message slot with an error.
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.message = Some(Message::Error(text.into()));
    }

    /// Replaces the message slot with a success notice.
    pub fn set_success(&mut self, text: impl Into<String>) {
        self.message = Some(Message::Success(text.into()));
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.message {
            Some(Message::Error(text)) => Some(text),
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<&str> {
        match &self.message {
            Some(Message::Success(text)) => Some(text),
            _ => None,
        }
    }

    /// Whether a new conversion may start from this state.
    pub fn is_idle(&self) -> bool {
        !self.status.is_active()
    }

    /// Sets the selected input and forgets the previous input's duration.
    pub fn select_input(&mut self, input: SelectedInput) {
        self.selected_input = Some(input);
        self.input_duration_secs = 0.0;
    }

    /// Resets the run indicators.
    pub fn reset_progress(&mut self) {
        self.progress = 0.0;
        self.in_progress = false;
    }

    /// Moves to a terminal status: resets progress and drops the input.
    pub fn finish(&mut self, status: SessionStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.reset_progress();
        self.selected_input = None;
        self.input_duration_secs = 0.0;
    }
}
