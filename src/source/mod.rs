//! The image source boundary.
//!
//! Each container format implements [`ImageSource`]. A source hands over the pixel window, the header metadata and, on
//! request, float channels already upcast to `f32`.
//!
//! [`ExrImage`] reads OpenEXR files, [`MemoryImage`] holds everything in
//! memory.

mod openexr;

pub use openexr::ExrImage;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use half::f16;
use tracing::debug;

use crate::error::CryptomatteError;
use crate::matte::{ChannelStack, CryptomatteImage, Header, MetaValue, PixelWindow};

/// Something that can provide Cryptomatte image data.
pub trait ImageSource {
    /// Path of the image file; sidecar manifests resolve against it.
    fn path(&self) -> &Path;

    fn window(&self) -> PixelWindow;

    fn header(&self) -> &Header;

    /// Names of all channels in the image.
    fn channel_names(&self) -> Vec<String>;

    /// Reads the named channels into a `[height, width, names.len()]` stack.
    fn read_channels(&self, names: &[String]) -> Result<ChannelStack, CryptomatteError>;

    /// Builds the layer aggregate from this source's header.
    fn load_image(&self) -> Result<CryptomatteImage, CryptomatteError> {
        let channel_names = self.channel_names();
        CryptomatteImage::from_header(
            self.path(),
            self.window(),
            self.header(),
            channel_names.iter().map(String::as_str),
        )
    }
}

/// An image held entirely in memory.
///
/// Channels are stored as row-major planes of `height * width` floats.
#[derive(Clone, Debug)]
pub struct MemoryImage {
    path: PathBuf,
    window: PixelWindow,
    header: Header,
    channels: BTreeMap<String, Vec<f32>>,
}

impl MemoryImage {
    pub fn new(path: impl Into<PathBuf>, height: u32, width: u32) -> Self {
        Self {
            path: path.into(),
            window: PixelWindow::new(height, width),
            header: Header::new(),
            channels: BTreeMap::new(),
        }
    }

    /// Adds a header attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.header.insert(key.into(), value.into());
        self
    }

    /// Adds a channel plane. Length is checked on read.
    pub fn with_channel(mut self, name: impl Into<String>, plane: Vec<f32>) -> Self {
        self.channels.insert(name.into(), plane);
        self
    }

    /// Adds a half-precision plane, upcast to `f32`.
    pub fn with_half_channel(self, name: impl Into<String>, plane: &[f16]) -> Self {
        let upcast = plane.iter().map(|value| value.to_f32()).collect();
        self.with_channel(name, upcast)
    }
}

impl ImageSource for MemoryImage {
    fn path(&self) -> &Path {
        &self.path
    }

    fn window(&self) -> PixelWindow {
        self.window
    }

    fn header(&self) -> &Header {
        &self.header
    }

    fn channel_names(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    fn read_channels(&self, names: &[String]) -> Result<ChannelStack, CryptomatteError> {
        debug!("Reading {} channels from {}", names.len(), self.path.display());
        stack_planes(self.window, &self.channels, names)
    }
}

/// Interleaves the named planes into a stack shaped like `window`.
pub(crate) fn stack_planes(
    window: PixelWindow,
    channels: &BTreeMap<String, Vec<f32>>,
    names: &[String],
) -> Result<ChannelStack, CryptomatteError> {
    let planes = names
        .iter()
        .map(|name| {
            channels
                .get(name)
                .map(Vec::as_slice)
                .ok_or_else(|| CryptomatteError::MissingChannel(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if planes.is_empty() {
        return Ok(ChannelStack::empty(window.height, window.width));
    }
    ChannelStack::from_planes(window.height, window.width, &planes)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_channels_in_requested_order() {
        let image = MemoryImage::new("a.exr", 1, 2)
            .with_channel("A", vec![1.0, 2.0])
            .with_channel("B", vec![3.0, 4.0]);
        let stack = image
            .read_channels(&["B".to_string(), "A".to_string()])
            .expect("read");
        assert_eq!(stack.channels(), 2);
        assert_eq!(stack.get(0, 0, 0), 3.0);
        assert_eq!(stack.get(0, 1, 1), 2.0);
    }

    #[test]
    fn test_missing_channel() {
        let image = MemoryImage::new("a.exr", 1, 1);
        let err = image.read_channels(&["X.R".to_string()]).unwrap_err();
        assert!(matches!(err, CryptomatteError::MissingChannel(name) if name == "X.R"));
    }

    #[test]
    fn test_wrong_plane_length() {
        let image = MemoryImage::new("a.exr", 2, 2).with_channel("A", vec![0.0; 3]);
        let err = image.read_channels(&["A".to_string()]).unwrap_err();
        assert!(matches!(err, CryptomatteError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_half_channel_is_upcast() {
        let image = MemoryImage::new("a.exr", 1, 3).with_half_channel(
            "A",
            &[f16::from_f32(1.0), f16::from_f32(0.5), f16::from_f32(-2.0)],
        );
        let stack = image.read_channels(&["A".to_string()]).expect("read");
        assert_eq!(stack.get(0, 0, 0), 1.0);
        assert_eq!(stack.get(0, 1, 0), 0.5);
        assert_eq!(stack.get(0, 2, 0), -2.0);
    }

    #[test]
    fn test_load_image() {
        let image = MemoryImage::new("/shots/a.exr", 1, 1)
            .with_attribute("cryptomatte/abc/name", "CryptoObject")
            .with_attribute("cryptomatte/abc/manifest", r#"{"leaf": "3f800000"}"#)
            .with_channel("CryptoObject00.R", vec![1.0])
            .with_channel("CryptoObject00.G", vec![1.0])
            .with_channel("CryptoObject00.B", vec![0.0])
            .with_channel("CryptoObject00.A", vec![0.0]);
        let loaded = image.load_image().expect("load");
        let layer = loaded.get_layer("CryptoObject").expect("layer");
        assert_eq!(layer.channel_names.len(), 4);
        assert_eq!(layer.manifest.len(), 1);
    }
}
