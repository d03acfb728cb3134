use std::time::Duration;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::core::{
    DynFrameProvider, FrameStreamProvider, PixelFrame, PixelFrameStream, SourceResult,
    StreamMetadata,
};

/// Synthetic frame source used in tests and smoke runs. Each frame is black
/// with a solid white horizontal band that drifts downward one row per frame,
/// so the downstream mask codec has something non-trivial to chew on.
#[derive(Debug, Clone)]
pub struct MockProvider {
    frame_count: usize,
    width: u32,
    height: u32,
    band_height: u32,
    fps: f64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            frame_count: 30,
            width: 64,
            height: 36,
            band_height: 6,
            fps: 30.0,
        }
    }
}

impl MockProvider {
    pub fn new(frame_count: usize, width: u32, height: u32, band_height: u32, fps: f64) -> Self {
        Self {
            frame_count,
            width,
            height,
            band_height: band_height.max(1),
            fps,
        }
    }

    fn generate_frame(&self, index: usize) -> SourceResult<PixelFrame> {
        let mut data = vec![0u8; self.width as usize * self.height as usize * 3];
        let top = (index as u32) % self.height;
        for row in top..(top + self.band_height).min(self.height) {
            let start = row as usize * self.width as usize * 3;
            let end = start + self.width as usize * 3;
            data[start..end].fill(255);
        }
        let timestamp = Duration::from_secs_f64(index as f64 / self.fps);
        PixelFrame::from_owned(self.width, self.height, Some(timestamp), data)
    }
}

impl FrameStreamProvider for MockProvider {
    fn metadata(&self) -> StreamMetadata {
        StreamMetadata {
            fps: Some(self.fps),
            width: Some(self.width),
            height: Some(self.height),
            total_frames: Some(self.frame_count as u64),
        }
    }

    fn into_stream(self: Box<Self>) -> PixelFrameStream {
        let provider = *self;
        let (tx, rx) = mpsc::channel::<SourceResult<PixelFrame>>(provider.frame_count.clamp(1, 8));
        tokio::spawn(async move {
            for index in 0..provider.frame_count {
                let result = provider
                    .generate_frame(index)
                    .map(|frame| frame.with_frame_index(Some(index as u64)));
                let failed = result.is_err();
                if tx.send(result).await.is_err() || failed {
                    break;
                }
            }
        });
        Box::pin(ReceiverStream::new(rx))
    }
}

pub fn boxed_mock() -> DynFrameProvider {
    Box::new(MockProvider::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test(flavor = "multi_thread")]
    async fn mock_stream_yields_requested_frames() {
        let provider = MockProvider::new(3, 8, 8, 2, 30.0);
        let stream = Box::new(provider) as DynFrameProvider;
        let mut stream = stream.into_stream();
        let mut frames = Vec::new();
        while let Some(frame) = stream.next().await {
            frames.push(frame.unwrap());
        }
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].width(), 8);
        // Band top row tracks the frame index.
        assert_eq!(frames[0].rgb(0, 0), (255, 255, 255));
        assert_eq!(frames[1].rgb(0, 0), (0, 0, 0));
        assert_eq!(frames[1].rgb(0, 1), (255, 255, 255));
    }
}
