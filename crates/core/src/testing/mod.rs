//! Testing utilities and mock implementations.
//!
//! Mocks for every collaborator of the orchestrator, so the whole
//! conversion workflow can be exercised without ffmpeg or a real disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use videology_core::testing::{MockEngine, MockStager};
//! use videology_core::{ConversionOrchestrator, OrchestratorConfig};
//!
//! let engine = Arc::new(MockEngine::new());
//! let stager = Arc::new(MockStager::new());
//! let orchestrator = ConversionOrchestrator::new(
//!     OrchestratorConfig::with_output_dir("/out"),
//!     Arc::clone(&engine),
//!     stager,
//! );
//! ```

mod mock_engine;
mod mock_picker;
mod mock_stager;

pub use mock_engine::MockEngine;
pub use mock_picker::MockPicker;
pub use mock_stager::MockStager;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::session::SelectedInput;

    /// A picked input living under `/videos`.
    pub fn selected_input(file_name: &str) -> SelectedInput {
        SelectedInput::new(format!("/videos/{}", file_name))
    }
}
