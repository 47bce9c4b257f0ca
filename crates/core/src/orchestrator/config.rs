//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the conversion orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Directory receiving converted files.
    /// Defaults to the user's video directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Load the duration of every selected input through the engine.
    /// Without a duration, progress stays at 0 for the whole run.
    #[serde(default = "default_true")]
    pub probe_on_select: bool,
}

fn default_output_dir() -> PathBuf {
    dirs_next::video_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_true() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            probe_on_select: true,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a config writing into `output_dir`.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }
}
