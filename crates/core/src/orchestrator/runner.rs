//! Conversion orchestrator implementation.
//!
//! Drives one conversion at a time through the session state machine:
//! Idle -> Validating -> Staging -> Running -> Succeeded | Failed | Cancelled.
//!
//! The session lives in a watch channel. Every transition is a single
//! `send_if_modified` call, so checking the current state and moving on from
//! it cannot interleave with another transition. Each attempt carries a
//! number; signals belonging to an attempt that is no longer current are
//! dropped.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::engine::{CommandSpec, Engine, EngineHandle, EngineOutcome, ProgressSample};
use crate::naming::generate_file_name_now;
use crate::picker::InputPicker;
use crate::session::{ConversionSession, SelectedInput, SessionStatus, TargetFormat};
use crate::staging::Stager;

use super::config::OrchestratorConfig;
use super::progress::progress_ratio;
use super::types::{success_message, OrchestratorError, MSG_FAILED, MSG_STOPPED};

/// What `convert` claimed from the session after validation.
struct Claim {
    attempt: u64,
    input: SelectedInput,
    output_path: PathBuf,
}

/// The conversion orchestrator - owns the session and drives conversions.
pub struct ConversionOrchestrator<E, S>
where
    E: Engine + 'static,
    S: Stager + 'static,
{
    config: OrchestratorConfig,
    engine: Arc<E>,
    stager: Arc<S>,
    session: Arc<watch::Sender<ConversionSession>>,
}

impl<E, S> Clone for ConversionOrchestrator<E, S>
where
    E: Engine + 'static,
    S: Stager + 'static,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            engine: Arc::clone(&self.engine),
            stager: Arc::clone(&self.stager),
            session: Arc::clone(&self.session),
        }
    }
}

impl<E, S> ConversionOrchestrator<E, S>
where
    E: Engine + 'static,
    S: Stager + 'static,
{
    /// Create a new orchestrator with an idle session.
    pub fn new(config: OrchestratorConfig, engine: Arc<E>, stager: Arc<S>) -> Self {
        let (session, _) = watch::channel(ConversionSession::default());

        Self {
            config,
            engine,
            stager,
            session: Arc::new(session),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Current session state.
    pub fn snapshot(&self) -> ConversionSession {
        self.session.borrow().clone()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<ConversionSession> {
        self.session.subscribe()
    }

    /// Wait until no conversion is in flight and return the session.
    pub async fn wait_until_settled(&self) -> ConversionSession {
        let mut rx = self.session.subscribe();
        loop {
            {
                let session = rx.borrow_and_update();
                if session.is_idle() {
                    return session.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    /// Select the file to convert and load its duration.
    pub async fn select_input(&self, input: SelectedInput) -> Result<(), OrchestratorError> {
        let accepted = self.session.send_if_modified(|s| {
            if s.status.is_active() {
                return false;
            }
            s.select_input(input.clone());
            true
        });
        if !accepted {
            warn!("Ignoring input selection while a conversion is running");
            return Err(OrchestratorError::Busy);
        }

        info!("Selected input {:?}", input.path);

        if self.config.probe_on_select {
            self.load_duration(&input).await;
        }

        Ok(())
    }

    /// Let `picker` choose the input. Backing out leaves the session as is.
    pub async fn pick_input(
        &self,
        picker: &dyn InputPicker,
    ) -> Result<Option<SelectedInput>, OrchestratorError> {
        if !self.session.borrow().is_idle() {
            return Err(OrchestratorError::Busy);
        }

        match picker.pick().await {
            Ok(Some(input)) => {
                self.select_input(input.clone()).await?;
                Ok(Some(input))
            }
            Ok(None) => {
                debug!("Input pick cancelled by the user");
                Ok(None)
            }
            Err(e) => {
                let err = OrchestratorError::from(e);
                self.session.send_modify(|s| s.set_error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Choose the output container.
    pub fn set_target_format(&self, format: TargetFormat) -> Result<(), OrchestratorError> {
        let accepted = self.session.send_if_modified(|s| {
            if s.status.is_active() {
                return false;
            }
            s.target_format = Some(format);
            true
        });
        if accepted {
            Ok(())
        } else {
            Err(OrchestratorError::Busy)
        }
    }

    /// Feed the duration of the selected input, in seconds.
    pub fn set_input_duration(&self, duration_secs: f64) {
        let duration_secs = if duration_secs.is_finite() && duration_secs > 0.0 {
            duration_secs
        } else {
            0.0
        };
        self.session
            .send_modify(|s| s.input_duration_secs = duration_secs);
    }

    async fn load_duration(&self, input: &SelectedInput) {
        match self.engine.probe(&input.path).await {
            Ok(info) => {
                debug!("{:?} lasts {} seconds", input.path, info.duration_secs);
                self.session.send_if_modified(|s| {
                    // The user may have picked something else meanwhile
                    if s.selected_input.as_ref() != Some(input) {
                        return false;
                    }
                    s.input_duration_secs = if info.duration_secs.is_finite() {
                        info.duration_secs.max(0.0)
                    } else {
                        0.0
                    };
                    true
                });
            }
            Err(e) => warn!("Failed to load duration of {:?}: {}", input.path, e),
        }
    }

    /// Start converting the selected input.
    ///
    /// Returns once the engine has accepted the command; the conversion
    /// then continues in the background. The returned path is where the
    /// output will be written. Errors are also written to the session.
    pub async fn convert(&self) -> Result<PathBuf, OrchestratorError> {
        let claim = self.claim()?;
        let attempt = claim.attempt;

        info!(
            "Conversion {} started: {:?} -> {:?}",
            attempt, claim.input.path, claim.output_path
        );

        if !self.advance(attempt, SessionStatus::Validating, SessionStatus::Staging) {
            return Err(OrchestratorError::Cancelled);
        }

        let staged = match self.stager.stage(&claim.input).await {
            Ok(staged) => staged,
            Err(e) => {
                let err = OrchestratorError::Staging(e);
                warn!("Conversion {} failed while staging: {}", attempt, err);
                self.finish(attempt, SessionStatus::Failed, Some(err.to_string()));
                return Err(err);
            }
        };

        if !self.is_current(attempt, SessionStatus::Staging) {
            info!("Conversion {} was stopped while staging", attempt);
            return Err(OrchestratorError::Cancelled);
        }

        let command = CommandSpec::new(staged.path, claim.output_path.clone());
        let handle = match self.engine.submit(command).await {
            Ok(handle) => handle,
            Err(e) => {
                let err = OrchestratorError::Submission(e);
                warn!("Conversion {} could not be submitted: {}", attempt, err);
                self.session.send_if_modified(|s| {
                    if s.attempt != attempt || !s.status.is_active() {
                        return false;
                    }
                    s.status = SessionStatus::Idle;
                    s.reset_progress();
                    s.set_error(err.to_string());
                    true
                });
                return Err(err);
            }
        };

        if !self.advance(attempt, SessionStatus::Staging, SessionStatus::Running) {
            // Stopped while the engine was starting up
            if let Err(e) = self.engine.cancel().await {
                warn!("Failed to cancel engine command {}: {}", handle.id, e);
            }
            return Err(OrchestratorError::Cancelled);
        }

        debug!("Conversion {} runs as engine command {}", attempt, handle.id);
        tokio::spawn(Self::drive(
            Arc::clone(&self.engine),
            Arc::clone(&self.session),
            attempt,
            handle,
            claim.output_path.clone(),
        ));

        Ok(claim.output_path)
    }

    /// Stop the running conversion.
    ///
    /// Progress and the in-progress flag are reset whether or not the engine
    /// acknowledges. Returns whether a conversion was active.
    pub async fn cancel(&self) -> bool {
        if let Err(e) = self.engine.cancel().await {
            warn!("Engine did not accept the cancel request: {}", e);
        }

        let mut was_active = false;
        self.session.send_modify(|s| {
            was_active = s.status.is_active();
            if was_active {
                s.finish(SessionStatus::Cancelled);
                s.set_error(MSG_STOPPED);
            } else {
                s.reset_progress();
            }
        });

        if was_active {
            info!("Conversion {} stopped by the user", self.session.borrow().attempt);
        }
        was_active
    }

    /// Validate the selections and claim a new attempt.
    fn claim(&self) -> Result<Claim, OrchestratorError> {
        let mut claim = Err(OrchestratorError::Busy);

        self.session.send_if_modified(|s| {
            if s.status.is_active() {
                return false;
            }

            let Some(input) = s.selected_input.clone() else {
                s.status = SessionStatus::Idle;
                s.set_error(OrchestratorError::MissingInput.to_string());
                claim = Err(OrchestratorError::MissingInput);
                return true;
            };
            let Some(format) = s.target_format else {
                s.status = SessionStatus::Idle;
                s.set_error(OrchestratorError::MissingFormat.to_string());
                claim = Err(OrchestratorError::MissingFormat);
                return true;
            };

            let file_name = format!("{}.{}", generate_file_name_now(), format.extension());
            let output_path = self.config.output_dir.join(&file_name);

            s.attempt += 1;
            s.status = SessionStatus::Validating;
            s.clear_message();
            s.progress = 0.0;
            s.in_progress = true;
            s.output_file_name = Some(file_name);
            s.output_path = Some(output_path.clone());

            claim = Ok(Claim {
                attempt: s.attempt,
                input,
                output_path,
            });
            true
        });

        if let Err(e) = &claim {
            debug!("Conversion not started: {}", e);
        }
        claim
    }

    fn is_current(&self, attempt: u64, status: SessionStatus) -> bool {
        let s = self.session.borrow();
        s.attempt == attempt && s.status == status
    }

    /// Move `attempt` from `from` to `to`. Fails if the attempt moved on.
    fn advance(&self, attempt: u64, from: SessionStatus, to: SessionStatus) -> bool {
        self.session.send_if_modified(|s| {
            if s.attempt != attempt || s.status != from {
                return false;
            }
            s.status = to;
            true
        })
    }

    fn finish(&self, attempt: u64, status: SessionStatus, error: Option<String>) -> bool {
        finish_attempt(&self.session, attempt, status, error)
    }

    /// Relays engine signals of one attempt into the session.
    async fn drive(
        engine: Arc<E>,
        session: Arc<watch::Sender<ConversionSession>>,
        attempt: u64,
        mut handle: EngineHandle,
        output_path: PathBuf,
    ) {
        let mut progress_open = true;

        let outcome = loop {
            tokio::select! {
                // Completion wins over any progress queued behind it
                biased;

                outcome = &mut handle.completion => {
                    break outcome.unwrap_or(EngineOutcome::Unknown);
                }

                sample = handle.progress.recv(), if progress_open => match sample {
                    Some(sample) => apply_progress(&session, attempt, &sample),
                    None => progress_open = false,
                },
            }
        };

        // Samples still in flight are never read
        drop(handle.progress);

        match outcome {
            EngineOutcome::Completed => {
                let mut applied = false;
                session.send_if_modified(|s| {
                    if s.attempt != attempt || s.status != SessionStatus::Running {
                        return false;
                    }
                    s.finish(SessionStatus::Succeeded);
                    s.set_success(success_message(&output_path));
                    applied = true;
                    true
                });
                if applied {
                    info!("Conversion {} finished: {:?}", attempt, output_path);
                } else {
                    debug!("Ignoring completion of stale conversion {}", attempt);
                }
            }
            EngineOutcome::Failed { reason } => {
                if finish_attempt(
                    &session,
                    attempt,
                    SessionStatus::Failed,
                    Some(MSG_FAILED.to_string()),
                ) {
                    warn!("Conversion {} failed: {}", attempt, reason.unwrap_or_default());
                    release_engine(engine.as_ref()).await;
                } else {
                    debug!("Ignoring failure of stale conversion {}", attempt);
                }
            }
            EngineOutcome::Cancelled | EngineOutcome::Unknown => {
                if finish_attempt(
                    &session,
                    attempt,
                    SessionStatus::Cancelled,
                    Some(MSG_STOPPED.to_string()),
                ) {
                    warn!("Conversion {} was aborted by the engine", attempt);
                    release_engine(engine.as_ref()).await;
                } else {
                    debug!("Ignoring abort of stale conversion {}", attempt);
                }
            }
        }
    }
}

fn apply_progress(
    session: &watch::Sender<ConversionSession>,
    attempt: u64,
    sample: &ProgressSample,
) {
    session.send_if_modified(|s| {
        if s.attempt != attempt || s.status != SessionStatus::Running {
            return false;
        }
        let ratio = progress_ratio(sample.elapsed_secs, s.input_duration_secs);
        // Samples may arrive out of order; progress never moves back
        if ratio > s.progress {
            s.progress = ratio;
            true
        } else {
            false
        }
    });
}

/// Ends an active attempt in a terminal status. Fails if the attempt moved on.
fn finish_attempt(
    session: &watch::Sender<ConversionSession>,
    attempt: u64,
    status: SessionStatus,
    error: Option<String>,
) -> bool {
    session.send_if_modified(|s| {
        if s.attempt != attempt || !s.status.is_active() {
            return false;
        }
        s.finish(status);
        if let Some(error) = error {
            s.set_error(error);
        }
        true
    })
}

/// Asks the engine to drop whatever it still holds for a dead run.
async fn release_engine<E: Engine + ?Sized>(engine: &E) {
    if let Err(e) = engine.cancel().await {
        warn!("Engine cleanup failed: {}", e);
    }
}
