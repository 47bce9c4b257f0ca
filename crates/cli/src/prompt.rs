//! Interactive prompts on stdin.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

use videology_core::picker::validate_video_path;
use videology_core::{InputPicker, PickerError, SelectedInput, TargetFormat};

/// Asks the user for the input file and the output type.
///
/// An empty answer (or end of input) means the user backed out.
pub struct PromptPicker<R> {
    lines: Mutex<Lines<BufReader<R>>>,
}

impl PromptPicker<Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R> PromptPicker<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(BufReader::new(reader).lines()),
        }
    }

    async fn ask(&self, question: &str) -> std::io::Result<Option<String>> {
        eprint!("{}", question);
        let line = self.lines.lock().await.next_line().await?;
        Ok(line
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()))
    }

    /// Lets the user choose an output type by number or name.
    pub async fn choose_format(&self) -> std::io::Result<Option<TargetFormat>> {
        for (i, format) in TargetFormat::ALL.iter().enumerate() {
            eprintln!("  {}) {}", i + 1, format.label());
        }

        loop {
            let Some(answer) = self.ask("Output type: ").await? else {
                return Ok(None);
            };
            match parse_format_choice(&answer) {
                Some(format) => return Ok(Some(format)),
                None => eprintln!("Unknown output type: {}", answer),
            }
        }
    }
}

/// Accepts a 1-based menu number or a format name.
fn parse_format_choice(answer: &str) -> Option<TargetFormat> {
    if let Ok(n) = answer.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| TargetFormat::ALL.get(i))
            .copied();
    }
    answer.parse().ok()
}

#[async_trait]
impl<R> InputPicker for PromptPicker<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn pick(&self) -> Result<Option<SelectedInput>, PickerError> {
        match self.ask("Video file to convert: ").await? {
            Some(answer) => validate_video_path(Path::new(&answer)).await.map(Some),
            None => {
                debug!("No input entered");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_format_choice() {
        assert_eq!(parse_format_choice("1"), Some(TargetFormat::Mp4));
        assert_eq!(parse_format_choice("6"), Some(TargetFormat::Mkv));
        assert_eq!(parse_format_choice("0"), None);
        assert_eq!(parse_format_choice("7"), None);
        assert_eq!(parse_format_choice("avi"), Some(TargetFormat::Avi));
        assert_eq!(parse_format_choice(".MOV"), Some(TargetFormat::Mov));
        assert_eq!(parse_format_choice("gif"), None);
    }

    #[tokio::test]
    async fn test_choose_format_retries_until_valid() {
        let prompt = PromptPicker::new(&b"gif\n\t\n2\n"[..]);
        // Whitespace-only answer counts as backing out
        assert_eq!(prompt.choose_format().await.unwrap(), None);

        let prompt = PromptPicker::new(&b"gif\nwmv\n"[..]);
        assert_eq!(prompt.choose_format().await.unwrap(), Some(TargetFormat::Wmv));
    }

    #[tokio::test]
    async fn test_choose_format_end_of_input() {
        let prompt = PromptPicker::new(&b""[..]);
        assert_eq!(prompt.choose_format().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pick_existing_video() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("holiday.mp4");
        std::fs::write(&path, b"video").unwrap();

        let answer = format!("  {}  \n", path.display());
        let prompt = PromptPicker::new(answer.as_bytes());

        let picked = prompt.pick().await.unwrap().unwrap();
        assert_eq!(picked.path, path);
        assert_eq!(picked.display_name, "holiday.mp4");
    }

    #[tokio::test]
    async fn test_pick_empty_answer_is_cancellation() {
        let prompt = PromptPicker::new(&b"\n"[..]);
        assert!(prompt.pick().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pick_missing_file() {
        let prompt = PromptPicker::new(&b"/definitely/not/here.mp4\n"[..]);
        assert!(matches!(
            prompt.pick().await,
            Err(PickerError::NotFound { .. })
        ));
    }
}
