//! Container I/O for the rectcast binary format, plus the async encode sink
//! that owns the output file during a pipeline run.

pub mod config;
pub mod container;
pub mod dump;
pub mod sink;

pub use config::{DEFAULT_DUMP_INTERVAL, EncodeSinkConfig, FrameMetadata, MaskDumpConfig};
pub use container::{ContainerError, ContainerReader, ContainerResult, ContainerWriter};
pub use dump::MaskDumpError;
pub use sink::{EncodeJob, EncodeProgress, EncodeSink, SinkError, SinkSummary};
