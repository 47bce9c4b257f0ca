//! Output container formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Container format a video can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Mp4,
    Webm,
    Mov,
    Wmv,
    Avi,
    Mkv,
}

impl TargetFormat {
    /// Every selectable format, in menu order.
    pub const ALL: [TargetFormat; 6] = [
        Self::Mp4,
        Self::Webm,
        Self::Mov,
        Self::Wmv,
        Self::Avi,
        Self::Mkv,
    ];

    /// File extension of the output file (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Mov => "mov",
            Self::Wmv => "wmv",
            Self::Avi => "avi",
            Self::Mkv => "mkv",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mp4 => "MP4",
            Self::Webm => "WEBM",
            Self::Mov => "MOV",
            Self::Wmv => "WMV",
            Self::Avi => "AVI",
            Self::Mkv => "MKV",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returned when text does not name a [`TargetFormat`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown output type: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for TargetFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_and_label() {
        assert_eq!(TargetFormat::Mp4.extension(), "mp4");
        assert_eq!(TargetFormat::Webm.label(), "WEBM");
        assert_eq!(TargetFormat::Mkv.to_string(), "mkv");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("MOV".parse::<TargetFormat>().unwrap(), TargetFormat::Mov);
        assert_eq!(" avi ".parse::<TargetFormat>().unwrap(), TargetFormat::Avi);
        assert_eq!(".wmv".parse::<TargetFormat>().unwrap(), TargetFormat::Wmv);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "flac".parse::<TargetFormat>().unwrap_err();
        assert_eq!(err, UnknownFormat("flac".to_string()));
    }

    #[test]
    fn test_serde_uses_extension() {
        let json = serde_json::to_string(&TargetFormat::Webm).unwrap();
        assert_eq!(json, "\"webm\"");
    }
}
