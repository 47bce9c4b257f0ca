//! Mock engine for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::engine::{
    CommandSpec, Engine, EngineError, EngineHandle, EngineOutcome, MediaInfo, ProgressSample,
};

/// The command the mock is currently "running".
#[derive(Debug)]
struct ActiveCommand {
    id: u64,
    progress_tx: mpsc::Sender<ProgressSample>,
    completion_tx: Option<oneshot::Sender<EngineOutcome>>,
}

/// Mock implementation of the Engine trait.
///
/// Nothing happens on its own: a submitted command runs until the test
/// emits progress and completes it.
/// - Track submitted commands for assertions
/// - Inject submit and probe errors
/// - Control probed durations
/// - Decide whether cancel requests are acknowledged
///
/// # Example
///
/// ```rust,ignore
/// use videology_core::testing::MockEngine;
///
/// let engine = MockEngine::new();
/// engine.set_duration("/videos/a.mov", 120.0).await;
///
/// // ... orchestrator.convert() ...
///
/// engine.emit_progress(30.0).await;
/// engine.complete(EngineOutcome::Completed).await;
/// assert_eq!(engine.submission_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// Recorded submissions.
    submissions: Arc<RwLock<Vec<CommandSpec>>>,
    /// Command waiting for the test to drive it.
    active: Arc<RwLock<Option<ActiveCommand>>>,
    /// If set, the next submit fails with this error.
    next_submit_error: Arc<RwLock<Option<EngineError>>>,
    /// If set, the next probe fails with this error.
    next_probe_error: Arc<RwLock<Option<EngineError>>>,
    /// Pre-configured durations by path.
    durations: Arc<RwLock<HashMap<PathBuf, f64>>>,
    /// Duration reported for unknown paths.
    default_duration: Arc<RwLock<f64>>,
    probe_count: Arc<AtomicUsize>,
    cancel_count: Arc<AtomicUsize>,
    /// Whether cancel completes the active command with `Cancelled`.
    acknowledge_cancel: Arc<AtomicBool>,
    next_id: Arc<AtomicU64>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a new mock engine.
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(Vec::new())),
            active: Arc::new(RwLock::new(None)),
            next_submit_error: Arc::new(RwLock::new(None)),
            next_probe_error: Arc::new(RwLock::new(None)),
            durations: Arc::new(RwLock::new(HashMap::new())),
            default_duration: Arc::new(RwLock::new(100.0)),
            probe_count: Arc::new(AtomicUsize::new(0)),
            cancel_count: Arc::new(AtomicUsize::new(0)),
            acknowledge_cancel: Arc::new(AtomicBool::new(true)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Get all recorded submissions.
    pub async fn submissions(&self) -> Vec<CommandSpec> {
        self.submissions.read().await.clone()
    }

    /// Get the number of submissions.
    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }

    /// Number of probes performed.
    pub fn probe_count(&self) -> usize {
        self.probe_count.load(Ordering::SeqCst)
    }

    /// Number of cancel requests received.
    pub fn cancel_count(&self) -> usize {
        self.cancel_count.load(Ordering::SeqCst)
    }

    /// Whether a submitted command is still waiting for its outcome.
    pub async fn has_active(&self) -> bool {
        self.active
            .read()
            .await
            .as_ref()
            .map(|c| c.completion_tx.is_some())
            .unwrap_or(false)
    }

    /// Set the duration probed for a specific path.
    pub async fn set_duration(&self, path: impl AsRef<Path>, duration_secs: f64) {
        self.durations
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), duration_secs);
    }

    /// Set the duration probed for paths without a specific one.
    pub async fn set_default_duration(&self, duration_secs: f64) {
        *self.default_duration.write().await = duration_secs;
    }

    /// Configure the next submit to fail with the given error.
    pub async fn set_next_submit_error(&self, error: EngineError) {
        *self.next_submit_error.write().await = Some(error);
    }

    /// Configure the next probe to fail with the given error.
    pub async fn set_next_probe_error(&self, error: EngineError) {
        *self.next_probe_error.write().await = Some(error);
    }

    /// Choose whether cancel requests end the active command.
    pub fn set_acknowledge_cancel(&self, acknowledge: bool) {
        self.acknowledge_cancel.store(acknowledge, Ordering::SeqCst);
    }

    /// Send a progress sample for the active command.
    ///
    /// Returns false if there is no command or nobody listens any more.
    pub async fn emit_progress(&self, elapsed_secs: f64) -> bool {
        let tx = match self.active.read().await.as_ref() {
            Some(command) => command.progress_tx.clone(),
            None => return false,
        };
        tx.send(ProgressSample {
            elapsed_secs,
            speed: Some("1.0x".to_string()),
        })
        .await
        .is_ok()
    }

    /// Report the outcome of the active command.
    ///
    /// Returns false if there is no command waiting for an outcome.
    pub async fn complete(&self, outcome: EngineOutcome) -> bool {
        let tx = self
            .active
            .write()
            .await
            .as_mut()
            .and_then(|c| c.completion_tx.take());
        match tx {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Drop the completion sender without an outcome.
    pub async fn abandon(&self) -> bool {
        self.active
            .write()
            .await
            .as_mut()
            .and_then(|c| c.completion_tx.take())
            .is_some()
    }

    /// Id of the active command, if any.
    pub async fn active_id(&self) -> Option<u64> {
        self.active.read().await.as_ref().map(|c| c.id)
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, EngineError> {
        self.probe_count.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.next_probe_error.write().await.take() {
            return Err(err);
        }

        let duration_secs = match self.durations.read().await.get(path) {
            Some(d) => *d,
            None => *self.default_duration.read().await,
        };

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes: 10 * 1024 * 1024, // 10 MB
            duration_secs,
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
            video_codec: Some("h264".to_string()),
            video_width: Some(1280),
            video_height: Some(720),
            audio_codec: Some("aac".to_string()),
        })
    }

    async fn submit(&self, command: CommandSpec) -> Result<EngineHandle, EngineError> {
        if let Some(err) = self.next_submit_error.write().await.take() {
            return Err(err);
        }

        self.submissions.write().await.push(command);

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (progress_tx, progress_rx) = mpsc::channel(32);
        let (completion_tx, completion_rx) = oneshot::channel();

        *self.active.write().await = Some(ActiveCommand {
            id,
            progress_tx,
            completion_tx: Some(completion_tx),
        });

        Ok(EngineHandle {
            id,
            progress: progress_rx,
            completion: completion_rx,
        })
    }

    async fn cancel(&self) -> Result<(), EngineError> {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);

        if self.acknowledge_cancel.load(Ordering::SeqCst) {
            let tx = self
                .active
                .write()
                .await
                .as_mut()
                .and_then(|c| c.completion_tx.take());
            if let Some(tx) = tx {
                let _ = tx.send(EngineOutcome::Cancelled);
            }
        }

        Ok(())
    }

    async fn validate(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_submit_and_complete() {
        let engine = MockEngine::new();
        let mut handle = engine
            .submit(CommandSpec::new("/in.mov", "/out.mp4"))
            .await
            .unwrap();

        assert!(engine.has_active().await);
        assert!(engine.emit_progress(12.5).await);
        assert_eq!(handle.progress.recv().await.unwrap().elapsed_secs, 12.5);

        assert!(engine.complete(EngineOutcome::Completed).await);
        assert_eq!(handle.completion.await.unwrap(), EngineOutcome::Completed);
        assert!(!engine.has_active().await);
        assert!(!engine.complete(EngineOutcome::Completed).await);
        assert_eq!(engine.submission_count().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_acknowledged() {
        let engine = MockEngine::new();
        let handle = engine
            .submit(CommandSpec::new("/in.mov", "/out.mp4"))
            .await
            .unwrap();

        engine.cancel().await.unwrap();
        assert_eq!(handle.completion.await.unwrap(), EngineOutcome::Cancelled);
        assert_eq!(engine.cancel_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_ignored() {
        let engine = MockEngine::new();
        engine.set_acknowledge_cancel(false);
        engine
            .submit(CommandSpec::new("/in.mov", "/out.mp4"))
            .await
            .unwrap();

        engine.cancel().await.unwrap();
        assert!(engine.has_active().await);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let engine = MockEngine::new();
        engine
            .set_next_submit_error(EngineError::submission_failed("bad command"))
            .await;

        let result = engine.submit(CommandSpec::new("/in.mov", "/out.mp4")).await;
        assert!(result.is_err());
        // Error is consumed and nothing recorded
        assert_eq!(engine.submission_count().await, 0);
        assert!(engine
            .submit(CommandSpec::new("/in.mov", "/out.mp4"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_probe_durations() {
        let engine = MockEngine::new();
        engine.set_duration("/a.mov", 42.0).await;

        assert_eq!(engine.probe(Path::new("/a.mov")).await.unwrap().duration_secs, 42.0);
        assert_eq!(engine.probe(Path::new("/b.mov")).await.unwrap().duration_secs, 100.0);
        assert_eq!(engine.probe_count(), 2);
    }
}
