use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Binary paths are not empty
/// - Copy buffer and progress channel are not zero-sized
/// - Output is not written into the scratch directory
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.engine.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.engine.ffprobe_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.ffprobe_path cannot be empty".to_string(),
        ));
    }

    if config.engine.progress_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "engine.progress_buffer cannot be 0".to_string(),
        ));
    }

    if config.staging.buffer_size == 0 {
        return Err(ConfigError::ValidationError(
            "staging.buffer_size cannot be 0".to_string(),
        ));
    }

    if config.orchestrator.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "orchestrator.output_dir cannot be empty".to_string(),
        ));
    }

    if config.orchestrator.output_dir == config.staging.scratch_dir {
        return Err(ConfigError::ValidationError(
            "orchestrator.output_dir cannot be the staging scratch_dir".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_buffer_fails() {
        let mut config = Config::default();
        config.staging.buffer_size = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_output_in_scratch_fails() {
        let mut config = Config::default();
        config.staging.scratch_dir = PathBuf::from("/tmp/shared");
        config.orchestrator.output_dir = PathBuf::from("/tmp/shared");
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("scratch_dir"));
    }

    #[test]
    fn test_validate_empty_ffmpeg_path_fails() {
        let mut config = Config::default();
        config.engine.ffmpeg_path = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }
}
