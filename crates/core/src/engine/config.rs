//! Configuration for the engine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Minimum interval between two progress samples, in milliseconds.
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,

    /// Capacity of the per-command progress channel.
    #[serde(default = "default_progress_buffer")]
    pub progress_buffer: usize,

    /// Overwrite the output file if it already exists.
    #[serde(default)]
    pub overwrite_output: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional ffmpeg arguments, placed before the output path.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_progress_interval() -> u64 {
    500
}

fn default_progress_buffer() -> usize {
    32
}

fn default_log_level() -> String {
    "warning".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            progress_interval_ms: default_progress_interval(),
            progress_buffer: default_progress_buffer(),
            overwrite_output: false,
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Creates a new config with custom ffmpeg/ffprobe paths.
    pub fn with_paths(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            ..Default::default()
        }
    }

    /// Sets the progress interval in milliseconds.
    pub fn with_progress_interval(mut self, interval_ms: u64) -> Self {
        self.progress_interval_ms = interval_ms;
        self
    }

    /// Sets whether existing output files get overwritten.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_output = overwrite;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.progress_interval_ms, 500);
        assert!(!config.overwrite_output);
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::with_paths(
            PathBuf::from("/usr/local/bin/ffmpeg"),
            PathBuf::from("/usr/local/bin/ffprobe"),
        )
        .with_progress_interval(0)
        .with_overwrite(true);

        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.progress_interval_ms, 0);
        assert!(config.overwrite_output);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: EngineConfig = toml::from_str("ffmpeg_log_level = \"error\"").unwrap();
        assert_eq!(config.ffmpeg_log_level, "error");
        assert_eq!(config.progress_buffer, 32);
    }
}
