//! FFmpeg engine integration tests.
//!
//! Real ffmpeg is not required: each test installs a small shell script
//! that speaks just enough of ffmpeg's `-progress` protocol.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tokio_test::assert_ok;

use videology_core::{CommandSpec, Engine, EngineConfig, EngineOutcome, FfmpegEngine};

/// Writes an executable script into `dir`.
fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    let mut perms = std::fs::metadata(&path)
        .expect("Failed to stat script")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("Failed to chmod script");
    path
}

struct TestHarness {
    temp_dir: TempDir,
    input_path: PathBuf,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let input_path = temp_dir.path().join("clip.mov");
        std::fs::write(&input_path, b"not really a movie").expect("Failed to write input");
        Self {
            temp_dir,
            input_path,
        }
    }

    fn engine(&self, ffmpeg_body: &str) -> FfmpegEngine {
        let ffmpeg = install_script(self.temp_dir.path(), "ffmpeg", ffmpeg_body);
        let ffprobe = install_script(self.temp_dir.path(), "ffprobe", "exit 0");
        FfmpegEngine::new(EngineConfig::with_paths(ffmpeg, ffprobe).with_progress_interval(0))
    }

    fn output_path(&self) -> PathBuf {
        self.temp_dir
            .path()
            .join("out")
            .join("videology-2024-03-05-09-07-02.mp4")
    }
}

const SUCCESS_SCRIPT: &str = r#"for last; do :; done
printf 'frame=10\nout_time_ms=5000000\nspeed=2.5x\nprogress=continue\n' >&2
printf 'frame=20\nout_time_ms=10000000\nspeed=2.5x\nprogress=end\n' >&2
echo converted > "$last"
exit 0"#;

#[tokio::test]
async fn test_successful_run_reports_progress() {
    let harness = TestHarness::new();
    let engine = harness.engine(SUCCESS_SCRIPT);
    let output_path = harness.output_path();

    let mut handle = assert_ok!(
        engine
            .submit(CommandSpec::new(&harness.input_path, &output_path))
            .await
    );

    let outcome = tokio::time::timeout(Duration::from_secs(10), &mut handle.completion)
        .await
        .expect("Timed out waiting for ffmpeg")
        .expect("Completion channel dropped");
    assert_eq!(outcome, EngineOutcome::Completed);

    let mut samples = Vec::new();
    while let Ok(sample) = handle.progress.try_recv() {
        samples.push(sample);
    }
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].elapsed_secs, 5.0);
    assert_eq!(samples[0].speed.as_deref(), Some("2.5x"));
    assert_eq!(samples[1].elapsed_secs, 10.0);

    // Parent directory was created on submit
    assert!(output_path.exists());
}

#[tokio::test]
async fn test_missing_output_is_a_failure() {
    let harness = TestHarness::new();
    let engine = harness.engine("exit 0");

    let handle = engine
        .submit(CommandSpec::new(&harness.input_path, harness.output_path()))
        .await
        .unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(10), handle.completion)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(outcome, EngineOutcome::Failed { .. }));
}

#[tokio::test]
async fn test_failed_run_removes_partial_output() {
    let harness = TestHarness::new();
    let engine = harness.engine(
        r#"for last; do :; done
echo partial > "$last"
echo 'Error while decoding stream #0:0' >&2
exit 1"#,
    );
    let output_path = harness.output_path();

    let handle = engine
        .submit(CommandSpec::new(&harness.input_path, &output_path))
        .await
        .unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(10), handle.completion)
        .await
        .unwrap()
        .unwrap();

    match outcome {
        EngineOutcome::Failed {
            reason: Some(reason),
        } => {
            assert!(reason.contains("exited with code: 1"));
            assert!(reason.contains("Error while decoding"));
        }
        other => panic!("Expected failure, got {:?}", other),
    }
    assert!(!output_path.exists());
}

#[tokio::test]
async fn test_cancel_kills_running_command() {
    let harness = TestHarness::new();
    let engine = harness.engine("exec sleep 30");

    let handle = engine
        .submit(CommandSpec::new(&harness.input_path, harness.output_path()))
        .await
        .unwrap();

    assert_ok!(engine.cancel().await);

    let outcome = tokio::time::timeout(Duration::from_secs(10), handle.completion)
        .await
        .expect("Cancelled command kept running")
        .unwrap();
    assert_eq!(outcome, EngineOutcome::Cancelled);
}

#[tokio::test]
async fn test_validate_with_installed_binaries() {
    let harness = TestHarness::new();
    let engine = harness.engine("exit 0");

    assert_ok!(engine.validate().await);
}

#[tokio::test]
async fn test_probe_reads_duration() {
    let harness = TestHarness::new();
    let ffprobe = install_script(
        harness.temp_dir.path(),
        "ffprobe-json",
        r#"cat <<'EOF'
{"format": {"format_name": "mov,mp4,m4a", "duration": "42.250000", "size": "18"},
 "streams": [{"codec_type": "video", "codec_name": "h264", "width": 640, "height": 360}]}
EOF"#,
    );
    let engine = FfmpegEngine::new(EngineConfig::with_paths(
        PathBuf::from("ffmpeg"),
        ffprobe,
    ));

    let info = assert_ok!(engine.probe(&harness.input_path).await);
    assert_eq!(info.duration_secs, 42.25);
    assert_eq!(info.format, "mov");
    assert_eq!(info.video_codec.as_deref(), Some("h264"));
    assert_eq!(info.video_width, Some(640));
    assert_eq!(info.audio_codec, None);
}
