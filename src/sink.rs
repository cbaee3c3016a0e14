//! The image sink boundary.
//!
//! The decoder produces grayscale masks and RGB previews; an [`ImageSink`]
//! persists them. [`PngSink`] writes PNG files through the `image` crate,
//! [`MemorySink`] keeps everything in memory for tests and embedding.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::info;

use crate::error::CryptomatteError;

/// Something that persists output images.
///
/// Accepts 8-bit grayscale, RGB and RGBA images.
pub trait ImageSink {
    fn write(&mut self, path: &Path, image: &DynamicImage) -> Result<(), CryptomatteError>;
}

/// Writes PNG files, creating parent directories as needed.
#[derive(Clone, Debug, Default)]
pub struct PngSink;

impl ImageSink for PngSink {
    fn write(&mut self, path: &Path, image: &DynamicImage) -> Result<(), CryptomatteError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| CryptomatteError::ImageWrite {
                path: path.to_path_buf(),
                source,
            })?;
        info!("Saved {}", path.display());
        Ok(())
    }
}

/// Collects written images in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub images: Vec<(PathBuf, DynamicImage)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds an image by the file name it was written under.
    pub fn get(&self, file_name: &str) -> Option<&DynamicImage> {
        self.images
            .iter()
            .find(|(path, _)| path.file_name().is_some_and(|n| n == file_name))
            .map(|(_, image)| image)
    }
}

impl ImageSink for MemorySink {
    fn write(&mut self, path: &Path, image: &DynamicImage) -> Result<(), CryptomatteError> {
        self.images.push((path.to_path_buf(), image.clone()));
        Ok(())
    }
}
