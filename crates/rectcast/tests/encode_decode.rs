use std::fs::File;
use std::io::BufReader;

use rectcast::pipeline::{PipelineConfig, run_pipeline};
use rectcast_sink::ContainerReader;
use rectcast_source::backends::mock::MockProvider;
use rectcast_source::core::{
    FrameStreamProvider, PixelFrame, PixelFrameStream, SourceError, StreamMetadata,
    spawn_stream_from_channel,
};
use rectcast_source::{DynFrameProvider, SegmenterKind};

fn pipeline_config(output: std::path::PathBuf) -> PipelineConfig {
    PipelineConfig {
        output,
        segmenter: SegmenterKind::Luma,
        threshold: 127,
        fps_override: None,
        dump: None,
        channel_capacity: None,
        quiet: true,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn mock_stream_round_trips_through_the_container() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("mock.rcast");

    let provider: DynFrameProvider = Box::new(MockProvider::new(12, 64, 36, 6, 30.0));
    let report = run_pipeline(provider, &pipeline_config(output.clone()))
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.frames, 12);
    assert_eq!(report.frame_rate, 30);
    assert!(report.rects >= 12, "each band frame must yield a rectangle");

    let reader = ContainerReader::new(BufReader::new(File::open(&output).unwrap())).unwrap();
    let (frame_rate, frames) = reader.read_all().unwrap();
    assert_eq!(frame_rate, 30);
    assert_eq!(frames.len(), 12);
    for frame in &frames {
        assert!(!frame.is_empty());
        for rect in frame {
            assert!(rect.width >= 1 && rect.height >= 1);
            assert!(rect.x + rect.width <= 64);
            assert!(rect.y + rect.height <= 36);
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn fps_override_beats_source_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("fps.rcast");

    let provider: DynFrameProvider = Box::new(MockProvider::new(2, 16, 16, 4, 30.0));
    let mut config = pipeline_config(output.clone());
    config.fps_override = Some(24);
    let report = run_pipeline(provider, &config).await.unwrap();
    assert_eq!(report.frame_rate, 24);

    let reader = ContainerReader::new(File::open(&output).unwrap()).unwrap();
    assert_eq!(reader.frame_rate(), 24);
}

/// Emits a couple of good frames, then fails like an unreadable source.
struct FailingProvider {
    good_frames: usize,
}

impl FrameStreamProvider for FailingProvider {
    fn metadata(&self) -> StreamMetadata {
        StreamMetadata {
            fps: Some(30.0),
            ..Default::default()
        }
    }

    fn into_stream(self: Box<Self>) -> PixelFrameStream {
        let good_frames = self.good_frames;
        spawn_stream_from_channel(4, move |tx| {
            for index in 0..good_frames {
                let data = vec![255u8; 8 * 8 * 3];
                let frame = PixelFrame::from_owned(8, 8, None, data)
                    .unwrap()
                    .with_frame_index(Some(index as u64));
                if tx.blocking_send(Ok(frame)).is_err() {
                    return;
                }
            }
            let _ = tx.blocking_send(Err(SourceError::backend_failure(
                "test",
                "frame decode failed",
            )));
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn source_failure_finalizes_a_short_container() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("short.rcast");

    let provider: DynFrameProvider = Box::new(FailingProvider { good_frames: 2 });
    let report = run_pipeline(provider, &pipeline_config(output.clone()))
        .await
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.frames, 2);
    assert!(report.short_reason.unwrap().contains("frame decode failed"));

    // The short container is still well-formed and fully decodable.
    let reader = ContainerReader::new(File::open(&output).unwrap()).unwrap();
    let (_, frames) = reader.read_all().unwrap();
    assert_eq!(frames.len(), 2);
    // All-white 8x8 frames collapse to a single full-frame rectangle.
    for frame in &frames {
        assert_eq!(frame.len(), 1);
        assert_eq!((frame[0].width, frame[0].height), (8, 8));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_frames_produce_sentinel_only_segments() {
    struct DarkProvider;

    impl FrameStreamProvider for DarkProvider {
        fn into_stream(self: Box<Self>) -> PixelFrameStream {
            spawn_stream_from_channel(2, move |tx| {
                for index in 0..3u64 {
                    let frame = PixelFrame::from_owned(16, 9, None, vec![0u8; 16 * 9 * 3])
                        .unwrap()
                        .with_frame_index(Some(index));
                    if tx.blocking_send(Ok(frame)).is_err() {
                        return;
                    }
                }
            })
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("dark.rcast");
    let report = run_pipeline(Box::new(DarkProvider), &pipeline_config(output.clone()))
        .await
        .unwrap();

    assert_eq!(report.frames, 3);
    assert_eq!(report.rects, 0);

    let reader = ContainerReader::new(File::open(&output).unwrap()).unwrap();
    let (_, frames) = reader.read_all().unwrap();
    assert_eq!(frames, vec![Vec::new(), Vec::new(), Vec::new()]);
}
