use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment variables overriding the configuration,
/// e.g. `VIDEOLOGY_ENGINE__FFMPEG_PATH`.
pub const ENV_PREFIX: &str = "VIDEOLOGY_";

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    figment_for(path)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Like [`load_config`], but a missing file means built-in defaults
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    figment_for(path)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[engine]
progress_interval_ms = 250
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.engine.progress_interval_ms, 250);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[engine]
progress_interval_ms = "soon"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/videology.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_or_default_without_file() {
        let config = load_config_or_default(Path::new("/nonexistent/videology.toml")).unwrap();
        assert_eq!(config.staging.buffer_size, 1024 * 1024);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[staging]
scratch_dir = "/tmp/videology-test"

[orchestrator]
output_dir = "/tmp/videology-out"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.staging.scratch_dir, PathBuf::from("/tmp/videology-test"));
        assert_eq!(config.orchestrator.output_dir, PathBuf::from("/tmp/videology-out"));
    }
}
