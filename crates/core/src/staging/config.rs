//! Configuration for the staging module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the file system stager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory receiving copies of the picked inputs.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Buffer size for file copies in bytes.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("videology")
}

fn default_buffer_size() -> usize {
    1024 * 1024 // 1 MB
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl StagingConfig {
    /// Creates a config staging into `scratch_dir`.
    pub fn with_scratch_dir(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            ..Default::default()
        }
    }

    /// Sets the copy buffer size.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}
