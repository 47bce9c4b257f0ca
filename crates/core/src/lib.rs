pub mod config;
pub mod engine;
pub mod naming;
pub mod orchestrator;
pub mod picker;
pub mod session;
pub mod staging;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, LoggingConfig,
};
pub use engine::{
    CommandSpec, Engine, EngineConfig, EngineError, EngineHandle, EngineOutcome, FfmpegEngine,
    MediaInfo, ProgressSample,
};
pub use naming::{generate_file_name, generate_file_name_now, pad_number};
pub use orchestrator::{ConversionOrchestrator, OrchestratorConfig, OrchestratorError};
pub use picker::{InputPicker, PathPicker, PickerError};
pub use session::{ConversionSession, Message, SelectedInput, SessionStatus, TargetFormat};
pub use staging::{FsStager, StagedFile, Stager, StagingConfig, StagingError};
