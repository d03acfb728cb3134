pub mod cli;
pub mod inspect;
pub mod pipeline;
pub mod progress;
pub mod settings;

pub use pipeline::{DEFAULT_FRAME_RATE, EncodeReport, PipelineConfig, PipelineError, run_pipeline};
pub use settings::{EffectiveSettings, SettingsError};
