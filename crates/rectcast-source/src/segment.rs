//! Pixel classification: turns a decoded frame into a foreground mask.
//!
//! Two interchangeable strategies exist. Both present the same contract to
//! the codec, which never looks past the `Segmenter` trait.

use std::fmt;
use std::str::FromStr;

use rectcast_types::{Mask, PixelFrame, SourceError};

pub trait Segmenter: Send + Sync {
    fn classify(&self, frame: &PixelFrame) -> Mask;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterKind {
    Luma,
    ChromaKey,
}

impl SegmenterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmenterKind::Luma => "luma",
            SegmenterKind::ChromaKey => "chroma-key",
        }
    }
}

impl FromStr for SegmenterKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "luma" | "bw" | "threshold" => Ok(SegmenterKind::Luma),
            "chroma-key" | "chroma" | "greenscreen" => Ok(SegmenterKind::ChromaKey),
            other => Err(SourceError::configuration(format!(
                "unknown segmenter '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SegmenterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_LUMA_THRESHOLD: u8 = 127;
pub const DEFAULT_MIN_GREEN: u8 = 90;
pub const DEFAULT_GREEN_DOMINANCE: u8 = 10;

/// Rec.601 luma threshold: bright pixels are foreground.
#[derive(Debug, Clone, Copy)]
pub struct LumaThreshold {
    pub threshold: u8,
}

impl Default for LumaThreshold {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LUMA_THRESHOLD,
        }
    }
}

impl Segmenter for LumaThreshold {
    fn classify(&self, frame: &PixelFrame) -> Mask {
        let mut mask = Mask::new(frame.width(), frame.height());
        let threshold = self.threshold as f32;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let (r, g, b) = frame.rgb(x, y);
                let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
                if luma > threshold {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }
}

/// Green-screen keying: green-dominant pixels are background, everything else
/// is foreground.
#[derive(Debug, Clone, Copy)]
pub struct ChromaKey {
    pub min_green: u8,
    pub dominance: u8,
}

impl Default for ChromaKey {
    fn default() -> Self {
        Self {
            min_green: DEFAULT_MIN_GREEN,
            dominance: DEFAULT_GREEN_DOMINANCE,
        }
    }
}

impl Segmenter for ChromaKey {
    fn classify(&self, frame: &PixelFrame) -> Mask {
        let mut mask = Mask::new(frame.width(), frame.height());
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let (r, g, b) = frame.rgb(x, y);
                let keyed = g > self.min_green
                    && g as u16 > r as u16 + self.dominance as u16
                    && g as u16 > b as u16 + self.dominance as u16;
                if !keyed {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }
}

pub fn build_segmenter(kind: SegmenterKind, luma_threshold: u8) -> Box<dyn Segmenter> {
    match kind {
        SegmenterKind::Luma => Box::new(LumaThreshold {
            threshold: luma_threshold,
        }),
        SegmenterKind::ChromaKey => Box::new(ChromaKey::default()),
    }
}
