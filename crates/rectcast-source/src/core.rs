use std::pin::Pin;

use futures_core::Stream;
use futures_util::stream::unfold;
use tokio::sync::mpsc::{self, Sender};

pub use rectcast_types::{PixelFrame, SourceError, SourceResult};

pub type PixelFrameStream = Pin<Box<dyn Stream<Item = SourceResult<PixelFrame>> + Send>>;

pub type DynFrameProvider = Box<dyn FrameStreamProvider>;

/// What a backend knows about its stream before decoding starts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StreamMetadata {
    pub fps: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub total_frames: Option<u64>,
}

impl StreamMetadata {
    pub fn new() -> Self {
        Self::default()
    }
}

pub trait FrameStreamProvider: Send + 'static {
    fn metadata(&self) -> StreamMetadata {
        StreamMetadata::default()
    }

    fn into_stream(self: Box<Self>) -> PixelFrameStream;
}

/// Runs a blocking producer on the blocking pool and exposes the channel as a
/// stream. Backends that decode files synchronously use this to stay off the
/// async worker threads.
pub fn spawn_stream_from_channel(
    capacity: usize,
    task: impl FnOnce(Sender<SourceResult<PixelFrame>>) + Send + 'static,
) -> PixelFrameStream {
    let (tx, rx) = mpsc::channel(capacity);
    tokio::task::spawn_blocking(move || task(tx));
    let stream = unfold(rx, |mut receiver| async {
        receiver.recv().await.map(|item| (item, receiver))
    });
    Box::pin(stream)
}
