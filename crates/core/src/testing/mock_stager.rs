//! Mock stager for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::session::SelectedInput;
use crate::staging::{StagedFile, Stager, StagingError};

/// Mock implementation of the Stager trait.
///
/// Pretends to copy inputs into `scratch_dir` without touching the disk.
#[derive(Debug, Clone)]
pub struct MockStager {
    scratch_dir: PathBuf,
    /// Recorded stage calls.
    staged: Arc<RwLock<Vec<SelectedInput>>>,
    /// If set, the next stage fails with this error.
    next_error: Arc<RwLock<Option<StagingError>>>,
    /// Simulated copy time.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockStager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStager {
    /// Create a new mock stager.
    pub fn new() -> Self {
        Self::with_scratch_dir("/scratch")
    }

    /// Create a mock stager pretending to copy into `scratch_dir`.
    pub fn with_scratch_dir(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            staged: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all inputs passed to `stage`.
    pub async fn staged_inputs(&self) -> Vec<SelectedInput> {
        self.staged.read().await.clone()
    }

    /// Get the number of stage calls.
    pub async fn stage_count(&self) -> usize {
        self.staged.read().await.len()
    }

    /// Configure the next stage to fail with the given error.
    pub async fn set_next_error(&self, error: StagingError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated copy time.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

#[async_trait]
impl Stager for MockStager {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stage(&self, input: &SelectedInput) -> Result<StagedFile, StagingError> {
        self.staged.write().await.push(input.clone());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let file_name = input.file_name().ok_or_else(|| StagingError::MissingFileName {
            path: input.path.clone(),
        })?;

        Ok(StagedFile {
            path: self.scratch_dir.join(file_name),
            size_bytes: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_records_and_maps_path() {
        let stager = MockStager::with_scratch_dir("/tmp/s");
        let staged = stager
            .stage(&SelectedInput::new("/videos/a.mov"))
            .await
            .unwrap();

        assert_eq!(staged.path, PathBuf::from("/tmp/s/a.mov"));
        assert_eq!(stager.stage_count().await, 1);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let stager = MockStager::new();
        stager
            .set_next_error(StagingError::SourceNotFound {
                path: PathBuf::from("/gone.mov"),
            })
            .await;

        assert!(stager.stage(&SelectedInput::new("/gone.mov")).await.is_err());
        assert!(stager.stage(&SelectedInput::new("/gone.mov")).await.is_ok());
    }
}
