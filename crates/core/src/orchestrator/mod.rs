//! Conversion orchestrator.
//!
//! Owns the [`ConversionSession`](crate::session::ConversionSession) and
//! drives it through one conversion at a time:
//! - **Validating**: an input and an output format must both be chosen
//! - **Staging**: the input is copied to scratch storage
//! - **Running**: the engine converts while progress is relayed
//! - **Succeeded / Failed / Cancelled**: progress is reset and the input
//!   dropped; a new conversion may start
//!
//! Observers follow the session through [`ConversionOrchestrator::subscribe`].

mod config;
mod progress;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use progress::progress_ratio;
pub use runner::ConversionOrchestrator;
pub use types::{
    success_message, OrchestratorError, MSG_FAILED, MSG_MISSING_FORMAT, MSG_MISSING_INPUT,
    MSG_STOPPED,
};
