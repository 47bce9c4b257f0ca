use std::path::PathBuf;

use clap::Parser;
use videology_core::TargetFormat;

/// Convert a video file to another container format.
#[derive(Debug, Parser)]
#[command(name = "videology", version, about)]
pub struct Args {
    /// Video file to convert. Asked for interactively when omitted.
    pub input: Option<PathBuf>,

    /// Output type: mp4, webm, mov, wmv, avi or mkv.
    #[arg(short, long)]
    pub format: Option<TargetFormat>,

    /// Configuration file (default: $VIDEOLOGY_CONFIG or videology.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the final session as JSON.
    #[arg(long)]
    pub json: bool,

    /// Check that ffmpeg and ffprobe can be run, then exit.
    #[arg(long)]
    pub check: bool,
}

impl Args {
    /// Where to load the configuration from.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .or_else(|| std::env::var_os("VIDEOLOGY_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("videology.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let args = Args::try_parse_from([
            "videology",
            "--format",
            "WEBM",
            "--config",
            "/etc/videology.toml",
            "--json",
            "clip.mov",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("clip.mov")));
        assert_eq!(args.format, Some(TargetFormat::Webm));
        assert_eq!(args.config_path(), PathBuf::from("/etc/videology.toml"));
        assert!(args.json);
        assert!(!args.check);
    }

    #[test]
    fn test_parse_minimal() {
        let args = Args::try_parse_from(["videology"]).unwrap();
        assert!(args.input.is_none());
        assert!(args.format.is_none());
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["videology", "-f", "gif", "clip.mov"]).is_err());
    }
}
