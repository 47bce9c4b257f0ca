//! Staging module: copies the picked input where the engine can read it.
//!
//! Picked files may live behind handles the engine cannot open directly, so
//! every conversion first copies its input into a scratch directory under
//! the same file name.

mod config;
mod error;
mod fs_stager;
mod traits;

pub use config::StagingConfig;
pub use error::StagingError;
pub use fs_stager::FsStager;
pub use traits::{StagedFile, Stager};
