use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;
pub const DEFAULT_DUMP_INTERVAL: u64 = 60;

#[derive(Clone, Debug)]
pub struct EncodeSinkConfig {
    pub output: PathBuf,
    pub frame_rate: u16,
    pub channel_capacity: usize,
    pub dump: Option<MaskDumpConfig>,
}

impl EncodeSinkConfig {
    pub fn new(output: PathBuf, frame_rate: u16) -> Self {
        Self {
            output,
            frame_rate,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            dump: None,
        }
    }

    pub fn with_dump(mut self, dump: Option<MaskDumpConfig>) -> Self {
        self.dump = dump;
        self
    }
}

/// Debug output: every Nth welded mask written as a grayscale PNG. Always
/// configured explicitly so encode runs stay reproducible; there is no
/// ambient debug flag.
#[derive(Clone, Debug)]
pub struct MaskDumpConfig {
    pub directory: PathBuf,
    pub interval: u64,
}

impl MaskDumpConfig {
    pub fn new(directory: PathBuf, interval: u64) -> Self {
        Self {
            directory,
            interval: interval.max(1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FrameMetadata {
    pub frame_index: u64,
    pub rect_count: usize,
    pub timestamp: Option<Duration>,
}
