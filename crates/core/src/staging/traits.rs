//! Trait definitions for the staging module.

use async_trait::async_trait;
use std::path::PathBuf;

use super::error::StagingError;
use crate::session::SelectedInput;

/// A file copied to where the engine can read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Location of the copy.
    pub path: PathBuf,
    /// Bytes copied.
    pub size_bytes: u64,
}

/// Copies picked inputs into scratch storage.
///
/// Staged copies are left in place; removing them is up to the caller.
#[async_trait]
pub trait Stager: Send + Sync {
    /// Returns the name of this stager implementation.
    fn name(&self) -> &str;

    /// Copies `input` into scratch storage, keeping its file name.
    async fn stage(&self, input: &SelectedInput) -> Result<StagedFile, StagingError>;
}
