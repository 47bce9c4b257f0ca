//! File system stager implementation.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info};

use super::config::StagingConfig;
use super::error::StagingError;
use super::traits::{StagedFile, Stager};
use crate::session::SelectedInput;

/// Stages inputs by copying them into a local scratch directory.
pub struct FsStager {
    config: StagingConfig,
}

impl FsStager {
    /// Creates a new file system stager with the given configuration.
    pub fn new(config: StagingConfig) -> Self {
        Self { config }
    }

    /// Creates a stager with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(StagingConfig::default())
    }

    /// Directory receiving the staged copies.
    pub fn scratch_dir(&self) -> &Path {
        &self.config.scratch_dir
    }

    /// Copies a file through a buffer, returning the bytes written.
    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<u64, StagingError> {
        let source_file = File::open(source).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StagingError::SourceNotFound {
                    path: source.to_path_buf(),
                }
            } else {
                StagingError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e)
            }
        })?;

        let dest_file = File::create(destination).await.map_err(|e| {
            StagingError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e)
        })?;

        let buffer_size = self.config.buffer_size.max(1);
        let mut reader = BufReader::with_capacity(buffer_size, source_file);
        let mut writer = BufWriter::with_capacity(buffer_size, dest_file);

        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; buffer_size];

        loop {
            let bytes_read = reader.read(&mut buffer).await.map_err(|e| {
                StagingError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e)
            })?;

            if bytes_read == 0 {
                break;
            }

            writer.write_all(&buffer[..bytes_read]).await.map_err(|e| {
                StagingError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e)
            })?;

            total_bytes += bytes_read as u64;
        }

        writer.flush().await.map_err(|e| {
            StagingError::copy_failed(source.to_path_buf(), destination.to_path_buf(), e)
        })?;

        Ok(total_bytes)
    }
}

#[async_trait]
impl Stager for FsStager {
    fn name(&self) -> &str {
        "fs"
    }

    async fn stage(&self, input: &SelectedInput) -> Result<StagedFile, StagingError> {
        let file_name = input
            .file_name()
            .ok_or_else(|| StagingError::MissingFileName {
                path: input.path.clone(),
            })?;

        fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(|e| StagingError::ScratchDirFailed {
                path: self.config.scratch_dir.clone(),
                error: e,
            })?;

        let destination = self.config.scratch_dir.join(&file_name);
        if destination == input.path {
            debug!("{:?} already lives in the scratch directory", input.path);
            let size_bytes = fs::metadata(&destination).await?.len();
            return Ok(StagedFile {
                path: destination,
                size_bytes,
            });
        }

        let size_bytes = self.copy_file(&input.path, &destination).await?;
        info!(
            "Staged {:?} as {:?} ({} bytes)",
            input.path, destination, size_bytes
        );

        Ok(StagedFile {
            path: destination,
            size_bytes,
        })
    }
}
