//! Input picker: how the user chooses the video to convert.
//!
//! Backing out of a pick is not an error, it yields `Ok(None)`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::session::SelectedInput;

/// Extensions accepted as video files.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "mov", "wmv", "avi", "mkv", "m4v", "mpg", "mpeg", "flv", "3gp", "ts",
];

/// Errors that can occur while picking an input.
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Not a video file: {path}")]
    NotAVideo { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lets the user choose one video file.
#[async_trait]
pub trait InputPicker: Send + Sync {
    /// Returns the chosen file, or `None` when the user backed out.
    async fn pick(&self) -> Result<Option<SelectedInput>, PickerError>;
}

/// Whether the path carries one of [`VIDEO_EXTENSIONS`].
pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Checks that `path` names an existing video file and wraps it.
pub async fn validate_video_path(path: &Path) -> Result<SelectedInput, PickerError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PickerError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(PickerError::Io(e)),
    };

    if !metadata.is_file() {
        return Err(PickerError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    if !is_video_path(path) {
        return Err(PickerError::NotAVideo {
            path: path.to_path_buf(),
        });
    }

    Ok(SelectedInput::new(path))
}

/// Picker returning a path decided up front, e.g. from the command line.
///
/// An empty picker behaves like a user who backed out.
#[derive(Debug, Clone, Default)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn empty() -> Self {
        Self { path: None }
    }
}

#[async_trait]
impl InputPicker for PathPicker {
    async fn pick(&self) -> Result<Option<SelectedInput>, PickerError> {
        match &self.path {
            Some(path) => validate_video_path(path).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_video_path() {
        assert!(is_video_path(Path::new("a.mp4")));
        assert!(is_video_path(Path::new("/x/y/B.MKV")));
        assert!(!is_video_path(Path::new("song.flac")));
        assert!(!is_video_path(Path::new("noext")));
    }

    #[tokio::test]
    async fn test_path_picker_valid_video() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movie.avi");
        std::fs::write(&path, b"x").unwrap();

        let picked = PathPicker::new(&path).pick().await.unwrap().unwrap();
        assert_eq!(picked.path, path);
        assert_eq!(picked.display_name, "movie.avi");
    }

    #[tokio::test]
    async fn test_path_picker_empty_is_cancellation() {
        assert!(PathPicker::empty().pick().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_path_picker_rejects_bad_paths() {
        let dir = TempDir::new().unwrap();

        let err = PathPicker::new(dir.path().join("missing.mp4"))
            .pick()
            .await
            .unwrap_err();
        assert!(matches!(err, PickerError::NotFound { .. }));

        let err = PathPicker::new(dir.path()).pick().await.unwrap_err();
        assert!(matches!(err, PickerError::NotAFile { .. }));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"x").unwrap();
        let err = PathPicker::new(&text).pick().await.unwrap_err();
        assert!(matches!(err, PickerError::NotAVideo { .. }));
    }
}
