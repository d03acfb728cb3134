use std::fs;
use std::path::Path;

use image::{GrayImage, Luma};
use rectcast_types::Mask;
use thiserror::Error;

use crate::config::MaskDumpConfig;

#[derive(Debug, Error)]
pub enum MaskDumpError {
    #[error("failed to create dump directory {directory}: {source}")]
    CreateDir {
        directory: String,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: image::ImageError,
    },
}

/// Writes every Nth welded mask to disk as a grayscale PNG, for eyeballing
/// segmentation and welding quality.
pub(crate) struct MaskDumpOperation {
    config: MaskDumpConfig,
}

impl MaskDumpOperation {
    pub fn new(config: MaskDumpConfig) -> Result<Self, MaskDumpError> {
        fs::create_dir_all(&config.directory).map_err(|source| MaskDumpError::CreateDir {
            directory: config.directory.display().to_string(),
            source,
        })?;
        Ok(Self { config })
    }

    pub fn process(&self, mask: &Mask, frame_index: u64) -> Result<(), MaskDumpError> {
        if frame_index % self.config.interval != 0 {
            return Ok(());
        }
        let path = self
            .config
            .directory
            .join(format!("mask_{frame_index:06}.png"));
        write_mask_png(mask, &path)
    }
}

fn write_mask_png(mask: &Mask, path: &Path) -> Result<(), MaskDumpError> {
    let image = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if mask.get(x, y) { 255 } else { 0 }])
    });
    image.save(path).map_err(|source| MaskDumpError::Write {
        path: path.display().to_string(),
        source,
    })
}
