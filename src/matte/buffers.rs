//! Pixel buffers used by the decoder.
//!
//! All buffers are row-major, with `(y, x)` addressing, exactly in the
//! order the image source produced them.

use image::GrayImage;

use crate::error::CryptomatteError;

/// A `[height, width, channels]` stack of float channels.
///
/// Channels pair up into ranks: rank `r` holds its ID at index `2r` and its
/// coverage at index `2r + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelStack {
    height: u32,
    width: u32,
    channels: usize,
    data: Vec<f32>,
}

impl ChannelStack {
    /// Wraps interleaved data (`channels` values per pixel).
    pub fn new(
        height: u32,
        width: u32,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, CryptomatteError> {
        let expected = height as usize * width as usize * channels;
        if data.len() != expected {
            return Err(CryptomatteError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Interleaves one plane per channel, each `height * width` long.
    pub fn from_planes(height: u32, width: u32, planes: &[&[f32]]) -> Result<Self, CryptomatteError> {
        let pixels = height as usize * width as usize;
        for plane in planes {
            if plane.len() != pixels {
                return Err(CryptomatteError::ShapeMismatch {
                    expected: pixels,
                    actual: plane.len(),
                });
            }
        }

        let mut data = Vec::with_capacity(pixels * planes.len());
        for i in 0..pixels {
            data.extend(planes.iter().map(|plane| plane[i]));
        }
        Self::new(height, width, planes.len(), data)
    }

    /// A stack with no channels at all.
    pub fn empty(height: u32, width: u32) -> Self {
        Self {
            height,
            width,
            channels: 0,
            data: Vec::new(),
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of complete (ID, coverage) pairs.
    #[inline]
    pub fn rank_count(&self) -> usize {
        self.channels / 2
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.height as usize * self.width as usize
    }

    /// The value of one channel at `(y, x)`.
    #[inline]
    pub fn get(&self, y: u32, x: u32, channel: usize) -> f32 {
        let pixel = y as usize * self.width as usize + x as usize;
        self.data[pixel * self.channels + channel]
    }

    /// Iterates the per-pixel channel slices in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[f32]> {
        // A channel-less stack holds no data, so any non-zero chunk size works.
        self.data.chunks_exact(self.channels.max(1))
    }
}

/// An 8-bit single-object coverage mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    height: u32,
    width: u32,
    data: Vec<u8>,
}

impl Mask {
    /// An all-zero mask.
    pub fn zeros(height: u32, width: u32) -> Self {
        Self {
            height,
            width,
            data: vec![0; height as usize * width as usize],
        }
    }

    /// Wraps row-major coverage bytes.
    pub fn from_vec(height: u32, width: u32, data: Vec<u8>) -> Result<Self, CryptomatteError> {
        let expected = height as usize * width as usize;
        if data.len() != expected {
            return Err(CryptomatteError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// A mask with every pixel set to `value`.
    pub fn filled(height: u32, width: u32, value: u8) -> Self {
        Self {
            height,
            width,
            data: vec![value; height as usize * width as usize],
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn get(&self, y: u32, x: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// True when every pixel holds the same value.
    ///
    /// Such a mask carries no shape information and is not worth persisting.
    pub fn is_empty(&self) -> bool {
        match (self.data.iter().min(), self.data.iter().max()) {
            (Some(min), Some(max)) => min == max,
            _ => true,
        }
    }

    pub(crate) fn same_size(&self, other: &Mask) -> bool {
        self.height == other.height && self.width == other.width
    }

    /// Converts to a grayscale image for an image sink.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

/// A per-pixel object label map. Label 0 is background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    height: u32,
    width: u32,
    labels: Vec<u32>,
}

impl LabelMap {
    /// An all-background label map.
    pub fn zeros(height: u32, width: u32) -> Self {
        Self {
            height,
            width,
            labels: vec![0; height as usize * width as usize],
        }
    }

    /// Wraps row-major labels.
    pub fn from_vec(height: u32, width: u32, labels: Vec<u32>) -> Result<Self, CryptomatteError> {
        let expected = height as usize * width as usize;
        if labels.len() != expected {
            return Err(CryptomatteError::ShapeMismatch {
                expected,
                actual: labels.len(),
            });
        }
        Ok(Self {
            height,
            width,
            labels,
        })
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn get(&self, y: u32, x: u32) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.labels
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.labels
    }

    /// The highest label present, 0 for an all-background map.
    pub fn max_label(&self) -> u32 {
        self.labels.iter().copied().max().unwrap_or(0)
    }
}
