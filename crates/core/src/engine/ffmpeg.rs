//! FFmpeg-based engine implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::error::EngineError;
use super::traits::Engine;
use super::types::{CommandSpec, EngineHandle, EngineOutcome, MediaInfo, ProgressSample};

/// FFmpeg-based engine implementation.
///
/// Every submitted command runs as its own `ffmpeg` child process,
/// supervised by a background task that relays `-progress` output and
/// reports the exit status.
pub struct FfmpegEngine {
    config: EngineConfig,
    cancel_tx: broadcast::Sender<()>,
    next_id: AtomicU64,
}

impl FfmpegEngine {
    /// Creates a new FFmpeg engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        let (cancel_tx, _) = broadcast::channel(1);
        Self {
            config,
            cancel_tx,
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Builds ffmpeg arguments for a command.
    fn build_args(&self, command: &CommandSpec) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            if self.config.overwrite_output {
                "-y".to_string()
            } else {
                "-n".to_string()
            },
            "-i".to_string(),
            command.input_path.to_string_lossy().to_string(),
        ];

        // Log level and progress
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-progress".to_string(),
            "pipe:2".to_string(),
            "-nostats".to_string(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        // Output
        args.push(command.output_path.to_string_lossy().to_string());

        args
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, EngineError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            codec_name: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| EngineError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        let duration_secs = probe
            .format
            .duration
            .as_ref()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let size_bytes = probe
            .format
            .size
            .as_ref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
        let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");

        let format_name = probe
            .format
            .format_name
            .split(',')
            .next()
            .unwrap_or("unknown");

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes,
            duration_secs,
            format: format_name.to_string(),
            video_codec: video_stream.and_then(|s| s.codec_name.clone()),
            video_width: video_stream.and_then(|s| s.width),
            video_height: video_stream.and_then(|s| s.height),
            audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
        })
    }

    fn spawn_error(&self, e: std::io::Error) -> EngineError {
        if e.kind() == std::io::ErrorKind::NotFound {
            EngineError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            EngineError::Io(e)
        }
    }
}

/// Accumulates the `key=value` lines ffmpeg writes with `-progress`.
struct ProgressParser {
    time_regex: Option<Regex>,
    speed_regex: Option<Regex>,
    elapsed_secs: f64,
    speed: Option<String>,
}

impl ProgressParser {
    fn new() -> Self {
        Self {
            time_regex: Regex::new(r"^out_time_ms=(\d+)").ok(),
            speed_regex: Regex::new(r"^speed=\s*(\d+\.?\d*)x").ok(),
            elapsed_secs: 0.0,
            speed: None,
        }
    }

    /// Feeds one line. Returns a sample when the line closes a progress block.
    fn feed(&mut self, line: &str) -> Option<ProgressSample> {
        let line = line.trim();

        if let Some(caps) = self.time_regex.as_ref().and_then(|re| re.captures(line)) {
            if let Ok(us) = caps[1].parse::<f64>() {
                // out_time_ms is in microseconds despite its name
                self.elapsed_secs = us / 1_000_000.0;
            }
        } else if let Some(caps) = self.speed_regex.as_ref().and_then(|re| re.captures(line)) {
            self.speed = Some(format!("{}x", &caps[1]));
        } else if line.starts_with("progress=") {
            return Some(ProgressSample {
                elapsed_secs: self.elapsed_secs,
                speed: self.speed.clone(),
            });
        }

        None
    }
}

/// Whether a stderr line is worth keeping for the failure reason.
fn is_error_line(line: &str) -> bool {
    !line.contains('=') && (line.contains("Error") || line.contains("error"))
        || line.contains("already exists")
}

fn exit_outcome(status: std::io::Result<ExitStatus>, error_output: &str) -> EngineOutcome {
    match status {
        Ok(status) if status.success() => EngineOutcome::Completed,
        Ok(status) => match status.code() {
            Some(code) => {
                let mut reason = format!("FFmpeg exited with code: {}", code);
                if !error_output.is_empty() {
                    reason.push('\n');
                    reason.push_str(error_output.trim_end());
                }
                EngineOutcome::Failed {
                    reason: Some(reason),
                }
            }
            // Terminated by a signal nobody here sent
            None => EngineOutcome::Unknown,
        },
        Err(e) => EngineOutcome::Failed {
            reason: Some(e.to_string()),
        },
    }
}

/// Context handed to the task supervising one ffmpeg process.
struct Supervision {
    id: u64,
    child: Child,
    output_path: PathBuf,
    output_existed: bool,
    progress_tx: mpsc::Sender<ProgressSample>,
    completion_tx: oneshot::Sender<EngineOutcome>,
    cancel_rx: broadcast::Receiver<()>,
    progress_interval: Duration,
}

impl Supervision {
    async fn run(mut self) {
        let outcome = self.watch().await;

        if outcome != EngineOutcome::Completed && !self.output_existed {
            // Partial output left behind by an aborted run
            if tokio::fs::remove_file(&self.output_path).await.is_ok() {
                debug!(
                    "Removed partial output {:?} of command {}",
                    self.output_path, self.id
                );
            }
        }

        match &outcome {
            EngineOutcome::Completed => info!("FFmpeg command {} completed", self.id),
            EngineOutcome::Failed { reason } => {
                warn!("FFmpeg command {} failed: {:?}", self.id, reason)
            }
            EngineOutcome::Cancelled => info!("FFmpeg command {} cancelled", self.id),
            EngineOutcome::Unknown => warn!("FFmpeg command {} ended unexpectedly", self.id),
        }

        if self.completion_tx.send(outcome).is_err() {
            debug!("Nobody is waiting for command {}", self.id);
        }
    }

    async fn watch(&mut self) -> EngineOutcome {
        let Some(stderr) = self.child.stderr.take() else {
            let _ = self.child.kill().await;
            return EngineOutcome::Failed {
                reason: Some("stderr was not captured".to_string()),
            };
        };

        let mut lines = BufReader::new(stderr).lines();
        let mut parser = ProgressParser::new();
        let mut error_output = String::new();
        let mut last_progress_send: Option<Instant> = None;
        let mut cancel_open = true;

        loop {
            tokio::select! {
                biased;

                signal = self.cancel_rx.recv(), if cancel_open => match signal {
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        if let Err(e) = self.child.kill().await {
                            warn!("Failed to kill ffmpeg for command {}: {}", self.id, e);
                        }
                        return EngineOutcome::Cancelled;
                    }
                    // Engine dropped, nobody can cancel any more
                    Err(RecvError::Closed) => cancel_open = false,
                },

                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if is_error_line(&line) {
                            error_output.push_str(&line);
                            error_output.push('\n');
                        }

                        if let Some(sample) = parser.feed(&line) {
                            let due = last_progress_send
                                .map(|t| t.elapsed() >= self.progress_interval)
                                .unwrap_or(true);
                            if due {
                                // Non-blocking send
                                let _ = self.progress_tx.try_send(sample);
                                last_progress_send = Some(Instant::now());
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read ffmpeg output for command {}: {}", self.id, e);
                        break;
                    }
                },
            }
        }

        let outcome = exit_outcome(self.child.wait().await, &error_output);

        if outcome == EngineOutcome::Completed
            && !tokio::fs::try_exists(&self.output_path)
                .await
                .unwrap_or(false)
        {
            return EngineOutcome::Failed {
                reason: Some("Output file not created".to_string()),
            };
        }

        outcome
    }
}

#[async_trait]
impl Engine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, EngineError> {
        if !path.exists() {
            return Err(EngineError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    EngineError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(EngineError::probe_failed(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(path, &stdout)
    }

    async fn submit(&self, command: CommandSpec) -> Result<EngineHandle, EngineError> {
        if !command.input_path.exists() {
            return Err(EngineError::InputNotFound {
                path: command.input_path.clone(),
            });
        }

        // Ensure output directory exists
        if let Some(parent) = command.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|_| {
                    EngineError::OutputDirectoryFailed {
                        path: parent.to_path_buf(),
                    }
                })?;
            }
        }

        let output_existed = tokio::fs::try_exists(&command.output_path)
            .await
            .unwrap_or(false);

        let args = self.build_args(&command);

        // Subscribe before spawning so a cancel racing the spawn is not lost
        let cancel_rx = self.cancel_tx.subscribe();

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (progress_tx, progress_rx) = mpsc::channel(self.config.progress_buffer.max(1));
        let (completion_tx, completion_rx) = oneshot::channel();

        info!(
            "Started ffmpeg command {}: {:?} -> {:?}",
            id, command.input_path, command.output_path
        );
        debug!("ffmpeg args for command {}: {:?}", id, args);

        let supervision = Supervision {
            id,
            child,
            output_path: command.output_path,
            output_existed,
            progress_tx,
            completion_tx,
            cancel_rx,
            progress_interval: Duration::from_millis(self.config.progress_interval_ms),
        };
        tokio::spawn(supervision.run());

        Ok(EngineHandle {
            id,
            progress: progress_rx,
            completion: completion_rx,
        })
    }

    async fn cancel(&self) -> Result<(), EngineError> {
        match self.cancel_tx.send(()) {
            Ok(receivers) => info!("Cancel requested for {} ffmpeg command(s)", receivers),
            Err(_) => debug!("Cancel requested with no ffmpeg command running"),
        }
        Ok(())
    }

    async fn validate(&self) -> Result<(), EngineError> {
        // Check ffmpeg exists
        let ffmpeg_result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffmpeg_result {
            return Err(self.spawn_error(e));
        }

        // Check ffprobe exists
        let ffprobe_result = Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = ffprobe_result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(EngineError::FfprobeNotFound {
                    path: self.config.ffprobe_path.clone(),
                });
            }
            return Err(EngineError::Io(e));
        }

        Ok(())
    }
}
