use std::fs::File;
use std::io::BufWriter;

use rectcast_types::{Mask, Rect};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{EncodeSinkConfig, FrameMetadata};
use crate::container::{ContainerError, ContainerWriter};
use crate::dump::{MaskDumpError, MaskDumpOperation};

pub type EncodeProgress = mpsc::UnboundedReceiver<FrameMetadata>;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("encode sink worker stopped")]
    Stopped,

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Dump(#[from] MaskDumpError),
}

/// One extracted frame on its way into the container.
pub struct EncodeJob {
    pub rects: Vec<Rect>,
    /// Welded mask, carried only when a debug dump is configured.
    pub mask: Option<Mask>,
    pub metadata: FrameMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkSummary {
    pub frames: u64,
    pub rects: u64,
}

/// Owns the container file and serializes frame segments strictly in
/// submission order. A single worker task is the ordering barrier: even if a
/// future pipeline extracts frames in parallel, segments land in the file in
/// the order they were submitted here.
pub struct EncodeSink {
    sender: mpsc::Sender<EncodeJob>,
    worker: JoinHandle<Result<SinkSummary, SinkError>>,
}

impl EncodeSink {
    pub fn create(config: EncodeSinkConfig) -> Result<(Self, EncodeProgress), SinkError> {
        let file = File::create(&config.output).map_err(ContainerError::Io)?;
        let writer = ContainerWriter::new(BufWriter::new(file), config.frame_rate)?;
        let dump = match config.dump {
            Some(dump_config) => Some(MaskDumpOperation::new(dump_config)?),
            None => None,
        };

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (sender, mut rx) = mpsc::channel::<EncodeJob>(config.channel_capacity.max(1));

        let worker = tokio::task::spawn_blocking(move || {
            let mut writer = writer;
            while let Some(job) = rx.blocking_recv() {
                let EncodeJob {
                    rects,
                    mask,
                    metadata,
                } = job;
                writer.write_frame(&rects)?;
                if let (Some(dump), Some(mask)) = (dump.as_ref(), mask.as_ref()) {
                    if let Err(err) = dump.process(mask, metadata.frame_index) {
                        // Debug output must never fail an encode.
                        eprintln!("mask dump error: {err}");
                    }
                }
                let _ = progress_tx.send(metadata);
            }
            let rects = writer.rects_written();
            let frames = writer.finish()?;
            Ok(SinkSummary { frames, rects })
        });

        Ok((Self { sender, worker }, progress_rx))
    }

    pub async fn submit(&self, job: EncodeJob) -> Result<(), SinkError> {
        self.sender.send(job).await.map_err(|_| SinkError::Stopped)
    }

    /// Closes the channel, waits for the worker to drain and flush, and
    /// returns what was written. A container error raised by the worker
    /// surfaces here.
    pub async fn shutdown(self) -> Result<SinkSummary, SinkError> {
        drop(self.sender);
        match self.worker.await {
            Ok(result) => result,
            Err(err) => {
                if !err.is_cancelled() {
                    eprintln!("encode sink worker task error: {err}");
                }
                Err(SinkError::Stopped)
            }
        }
    }
}
