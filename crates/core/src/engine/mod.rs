//! Engine module: the external component doing the actual transcoding.
//!
//! An [`Engine`] accepts a [`CommandSpec`] (input path + output path) and
//! runs it in the background. The caller gets an [`EngineHandle`] with two
//! channels: periodic [`ProgressSample`]s and a single [`EngineOutcome`].
//!
//! [`FfmpegEngine`] is the production implementation, spawning `ffmpeg`
//! and reading its `-progress` output. It also doubles as the metadata
//! source: [`Engine::probe`] asks `ffprobe` for the input's duration.
//!
//! # Example
//!
//! ```ignore
//! use videology_core::engine::{CommandSpec, Engine, FfmpegEngine};
//!
//! let engine = FfmpegEngine::with_defaults();
//! engine.validate().await?;
//!
//! let info = engine.probe(Path::new("/videos/in.mov")).await?;
//! println!("Duration: {} seconds", info.duration_secs);
//!
//! let mut handle = engine
//!     .submit(CommandSpec::new("/videos/in.mov", "/videos/out.mkv"))
//!     .await?;
//! while let Some(sample) = handle.progress.recv().await {
//!     println!("{}s", sample.elapsed_secs);
//! }
//! let outcome = handle.completion.await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EngineConfig;
pub use error::EngineError;
pub use ffmpeg::FfmpegEngine;
pub use traits::Engine;
pub use types::{CommandSpec, EngineHandle, EngineOutcome, MediaInfo, ProgressSample};
