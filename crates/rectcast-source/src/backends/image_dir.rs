use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;

use crate::core::{
    DynFrameProvider, FrameStreamProvider, PixelFrame, PixelFrameStream, SourceError,
    SourceResult, StreamMetadata, spawn_stream_from_channel,
};

const BACKEND_NAME: &str = "image-dir";
const DEFAULT_CHANNEL_CAPACITY: usize = 8;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Reads a directory of numbered image files, one per video frame, in sorted
/// filename order. This is the production path: an external transcoder dumps
/// frames to disk and rectcast never touches the video container itself.
#[derive(Debug)]
pub struct ImageDirProvider {
    frames: Vec<PathBuf>,
    target_size: Option<(u32, u32)>,
    fps: Option<f64>,
    channel_capacity: usize,
}

impl ImageDirProvider {
    pub fn open(
        directory: impl AsRef<Path>,
        target_size: Option<(u32, u32)>,
        fps: Option<f64>,
        channel_capacity: Option<usize>,
    ) -> SourceResult<Self> {
        let directory = directory.as_ref();
        let mut frames = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image {
                frames.push(path);
            }
        }
        if frames.is_empty() {
            return Err(SourceError::backend_failure(
                BACKEND_NAME,
                format!("no image frames found in {}", directory.display()),
            ));
        }
        frames.sort();
        Ok(Self {
            frames,
            target_size,
            fps,
            channel_capacity: channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY),
        })
    }

    fn decode_frame(path: &Path, target_size: Option<(u32, u32)>) -> SourceResult<PixelFrame> {
        let decoded = image::open(path).map_err(|err| {
            SourceError::backend_failure(
                BACKEND_NAME,
                format!("failed to decode {}: {err}", path.display()),
            )
        })?;
        let mut rgb = decoded.to_rgb8();
        if let Some((width, height)) = target_size {
            if rgb.dimensions() != (width, height) {
                // Nearest keeps the silhouette crisp for thresholding.
                rgb = image::imageops::resize(&rgb, width, height, FilterType::Nearest);
            }
        }
        let (width, height) = rgb.dimensions();
        PixelFrame::from_owned(width, height, None, rgb.into_raw())
    }
}

impl FrameStreamProvider for ImageDirProvider {
    fn metadata(&self) -> StreamMetadata {
        let (width, height) = match self.target_size {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        StreamMetadata {
            fps: self.fps,
            width,
            height,
            total_frames: Some(self.frames.len() as u64),
        }
    }

    fn into_stream(self: Box<Self>) -> PixelFrameStream {
        let Self {
            frames,
            target_size,
            channel_capacity,
            ..
        } = *self;
        spawn_stream_from_channel(channel_capacity.max(1), move |tx| {
            for (index, path) in frames.iter().enumerate() {
                let result = Self::decode_frame(path, target_size)
                    .map(|frame| frame.with_frame_index(Some(index as u64)));
                let failed = result.is_err();
                if tx.blocking_send(result).is_err() || failed {
                    break;
                }
            }
        })
    }
}

pub fn boxed_image_dir(
    directory: PathBuf,
    target_size: Option<(u32, u32)>,
    fps: Option<f64>,
    channel_capacity: Option<usize>,
) -> SourceResult<DynFrameProvider> {
    Ok(Box::new(ImageDirProvider::open(
        directory,
        target_size,
        fps,
        channel_capacity,
    )?))
}
