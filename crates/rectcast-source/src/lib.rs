pub mod backends;
pub mod config;
pub mod core;
pub mod segment;

pub use config::{Backend, Configuration, EnvOverrides};
pub use core::{
    DynFrameProvider, FrameStreamProvider, PixelFrame, PixelFrameStream, SourceError,
    SourceResult, StreamMetadata,
};
pub use segment::{
    ChromaKey, LumaThreshold, Segmenter, SegmenterKind, build_segmenter,
    DEFAULT_GREEN_DOMINANCE, DEFAULT_LUMA_THRESHOLD, DEFAULT_MIN_GREEN,
};
