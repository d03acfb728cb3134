use std::path::PathBuf;

use indicatif::ProgressBar;
use serde::Serialize;
use thiserror::Error;
use tokio_stream::StreamExt;

use crate::progress::{encode_bar_style, encode_spinner_style};
use crate::settings::{EffectiveSettings, SettingsError};
use rectcast_codec::{extract, weld};
use rectcast_sink::{
    ContainerError, EncodeJob, EncodeSink, EncodeSinkConfig, FrameMetadata, MaskDumpConfig,
    SinkError,
};
use rectcast_source::{DynFrameProvider, SegmenterKind, SourceError, build_segmenter};

pub const DEFAULT_FRAME_RATE: u16 = 30;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub output: PathBuf,
    pub segmenter: SegmenterKind,
    pub threshold: u8,
    pub fps_override: Option<u16>,
    pub dump: Option<MaskDumpConfig>,
    pub channel_capacity: Option<usize>,
    /// Suppresses the progress bar; used by tests and when stdout is piped.
    pub quiet: bool,
}

impl PipelineConfig {
    pub fn from_settings(settings: &EffectiveSettings) -> Self {
        Self {
            output: settings.output.clone(),
            segmenter: settings.segmenter,
            threshold: settings.threshold,
            fps_override: settings.fps,
            dump: settings
                .dump_dir
                .clone()
                .map(|dir| MaskDumpConfig::new(dir, settings.dump_interval)),
            channel_capacity: settings.channel_capacity,
            quiet: false,
        }
    }
}

/// What an encode run produced. A populated `short_reason` means the source
/// failed mid-stream and the container holds only the frames encoded up to
/// that point; the output is still valid and playable.
#[derive(Debug, Serialize)]
pub struct EncodeReport {
    pub output: PathBuf,
    pub frame_rate: u16,
    pub frames: u64,
    pub rects: u64,
    pub short_reason: Option<String>,
}

impl EncodeReport {
    pub fn is_complete(&self) -> bool {
        self.short_reason.is_none()
    }
}

/// Drives one encode: pull a frame, classify, weld, extract, submit to the
/// sink, repeat until the source is exhausted. Frames are processed one at a
/// time in stream order; the sink worker is the only other task and writes
/// segments in submission order.
pub async fn run_pipeline(
    provider: DynFrameProvider,
    config: &PipelineConfig,
) -> Result<EncodeReport, PipelineError> {
    let metadata = provider.metadata();
    let frame_rate = config
        .fps_override
        .or_else(|| {
            metadata
                .fps
                .map(|fps| fps.round().clamp(1.0, f64::from(u16::MAX)) as u16)
        })
        .unwrap_or(DEFAULT_FRAME_RATE);

    let segmenter = build_segmenter(config.segmenter, config.threshold);
    let dump_enabled = config.dump.is_some();

    let mut sink_config =
        EncodeSinkConfig::new(config.output.clone(), frame_rate).with_dump(config.dump.clone());
    if let Some(capacity) = config.channel_capacity {
        sink_config.channel_capacity = capacity;
    }
    let (sink, mut progress) = EncodeSink::create(sink_config)?;

    let bar = if config.quiet {
        ProgressBar::hidden()
    } else if let Some(total) = metadata.total_frames {
        let bar = ProgressBar::new(total);
        bar.set_style(encode_bar_style());
        bar
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(encode_spinner_style());
        bar
    };
    bar.set_prefix("encode");
    bar.set_message("0");

    let bar_task = {
        let bar = bar.clone();
        tokio::spawn(async move {
            let mut total_rects = 0u64;
            while let Some(written) = progress.recv().await {
                total_rects += written.rect_count as u64;
                bar.set_position(written.frame_index + 1);
                bar.set_message(total_rects.to_string());
            }
        })
    };

    let mut stream = provider.into_stream();
    let mut submitted = 0u64;
    let mut short_reason: Option<String> = None;

    while let Some(item) = stream.next().await {
        let frame = match item {
            Ok(frame) => frame,
            Err(err) => {
                // A failed read ends the stream; everything already written
                // stays in the container (non-fatal short result).
                short_reason = Some(err.to_string());
                break;
            }
        };

        let mask = segmenter.classify(&frame);
        let welded = weld(&mask);
        let rects = extract(&welded);

        let frame_metadata = FrameMetadata {
            frame_index: frame.frame_index().unwrap_or(submitted),
            rect_count: rects.len(),
            timestamp: frame.timestamp(),
        };
        let job = EncodeJob {
            rects,
            mask: dump_enabled.then_some(welded),
            metadata: frame_metadata,
        };
        if sink.submit(job).await.is_err() {
            // Worker already failed; its error surfaces from shutdown.
            break;
        }
        submitted += 1;
    }
    drop(stream);

    let summary = sink.shutdown().await?;
    let _ = bar_task.await;
    bar.finish_and_clear();

    Ok(EncodeReport {
        output: config.output.clone(),
        frame_rate,
        frames: summary.frames,
        rects: summary.rects,
        short_reason,
    })
}
