//! Shared domain models for the rectcast workspace.
//!
//! This crate centralizes the lightweight data structures used across the
//! source, codec, sink, and CLI crates. Keep it backend-agnostic and free of
//! heavy dependencies so every crate can depend on it without pulling image
//! decoders or async runtimes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub type SourceResult<T> = Result<T, SourceError>;

/// Binary container layout, shared by the writer and the debug reader.
///
/// The stream is little-endian throughout: a `u16` frame rate, then for each
/// frame a run of `(u16 x, u16 y, u16 w, u16 h)` records closed by the
/// all-zero sentinel record. There is no frame count and no length prefix;
/// consumers read until end of file.
pub mod wire {
    use std::mem;

    pub const FRAME_RATE_SIZE: usize = mem::size_of::<u16>();
    pub const RECT_RECORD_SIZE: usize = 4 * mem::size_of::<u16>();

    /// Frame data starts immediately after the frame-rate header.
    pub const DATA_START: usize = FRAME_RATE_SIZE;
}

/// Axis-aligned rectangle in the target frame's pixel space.
///
/// Every rectangle emitted by the extractor satisfies `width >= 1` and
/// `height >= 1`, which is what keeps the all-zero sentinel record
/// unambiguous on the wire. Fields are `u32` in memory; serialization narrows
/// them to `u16` and fails fast when a value does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// End-of-frame marker; never a valid rectangle.
    pub const SENTINEL: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// Binary foreground/background classification of one frame.
///
/// One byte per pixel, row-major, no stride padding; any nonzero byte is
/// foreground. Masks are ephemeral: born in a segmenter, conditioned by the
/// welder, consumed once by the extractor.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("foreground", &self.data.iter().filter(|&&v| v != 0).count())
            .finish()
    }
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> SourceResult<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(SourceError::InvalidFrame {
                reason: format!(
                    "mask byte count mismatch: got {} expected {expected}",
                    data.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize] != 0
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        self.data[y as usize * self.width as usize + x as usize] =
            if foreground { 255 } else { 0 };
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// One decoded video frame as packed RGB24.
#[derive(Clone)]
pub struct PixelFrame {
    width: u32,
    height: u32,
    frame_index: Option<u64>,
    timestamp: Option<Duration>,
    data: Arc<[u8]>,
}

impl fmt::Debug for PixelFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frame_index", &self.frame_index)
            .field("timestamp", &self.timestamp)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PixelFrame {
    pub fn from_owned(
        width: u32,
        height: u32,
        timestamp: Option<Duration>,
        data: Vec<u8>,
    ) -> SourceResult<Self> {
        let required = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| SourceError::InvalidFrame {
                reason: "calculated RGB frame length overflowed".into(),
            })?;
        if data.len() < required {
            return Err(SourceError::InvalidFrame {
                reason: format!(
                    "insufficient RGB bytes: got {} expected at least {required}",
                    data.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            frame_index: None,
            timestamp,
            data: Arc::from(data.into_boxed_slice()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB triple at `(x, y)`; callers guarantee in-bounds coordinates.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        (
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        )
    }

    pub fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    pub fn with_frame_index(mut self, index: Option<u64>) -> Self {
        self.frame_index = index;
        self
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("backend {backend} is not supported in this build")]
    Unsupported { backend: &'static str },

    #[error("{backend} backend failed: {message}")]
    BackendFailure {
        backend: &'static str,
        message: String,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub fn unsupported(backend: &'static str) -> Self {
        Self::Unsupported { backend }
    }

    pub fn backend_failure(backend: &'static str, message: impl Into<String>) -> Self {
        Self::BackendFailure {
            backend,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
