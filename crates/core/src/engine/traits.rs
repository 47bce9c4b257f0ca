//! Trait definitions for the engine module.

use async_trait::async_trait;
use std::path::Path;

use super::error::EngineError;
use super::types::{CommandSpec, EngineHandle, MediaInfo};

/// An external engine that converts media files in the background.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Probes a media file to get its information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, EngineError>;

    /// Starts a command and returns without waiting for it.
    ///
    /// Errors are only returned when the command could not be started at
    /// all; failures afterwards arrive as an outcome on the handle.
    async fn submit(&self, command: CommandSpec) -> Result<EngineHandle, EngineError>;

    /// Requests every running command to abort.
    ///
    /// Best-effort: a command that is already finishing may still complete.
    /// Does nothing when no command runs.
    async fn cancel(&self) -> Result<(), EngineError>;

    /// Validates that the engine is properly configured and ready.
    async fn validate(&self) -> Result<(), EngineError>;
}
