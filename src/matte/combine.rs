//! Combining object masks into a single label map.
//!
//! Objects claim pixels in the order they are presented: a later object
//! only takes over a pixel when its coverage is strictly higher than the
//! best coverage seen there so far. Equal coverage keeps the earlier label.

use image::RgbImage;
use serde::Serialize;

use super::buffers::{LabelMap, Mask};
use crate::error::CryptomatteError;

/// Largest label that survives 24-bit RGB packing.
pub const MAX_PACKED_LABEL: u32 = (1 << 24) - 1;

/// Incremental label combination.
///
/// Updates must be applied in a fixed order; the first object to reach the
/// highest coverage at a pixel keeps it.
#[derive(Clone, Debug)]
pub struct LabelCombiner {
    labels: LabelMap,
    best: Vec<u8>,
}

impl LabelCombiner {
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            labels: LabelMap::zeros(height, width),
            best: vec![0; height as usize * width as usize],
        }
    }

    /// Offers a mask under `label`. Label 0 is reserved for background.
    pub fn add(&mut self, label: u32, mask: &Mask) -> Result<(), CryptomatteError> {
        if label == 0 {
            return Err(CryptomatteError::ReservedLabel);
        }
        if mask.height() != self.labels.height() || mask.width() != self.labels.width() {
            return Err(CryptomatteError::MaskSizeMismatch {
                width: self.labels.width(),
                height: self.labels.height(),
                actual_width: mask.width(),
                actual_height: mask.height(),
            });
        }

        let labels = self.labels.as_mut_slice();
        for ((slot, best), &coverage) in labels.iter_mut().zip(&mut self.best).zip(mask.as_slice()) {
            if coverage > *best {
                *slot = label;
                *best = coverage;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> LabelMap {
        self.labels
    }
}

/// A label map and the label each named object received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabeledMasks {
    #[serde(skip)]
    pub labels: LabelMap,
    /// `(name, label)` in input order.
    pub assignments: Vec<(String, u32)>,
}

impl LabeledMasks {
    /// The label assigned to `name`, if it was part of the input.
    pub fn label_of(&self, name: &str) -> Option<u32> {
        self.assignments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, label)| *label)
    }
}

/// Labels masks `1..=K` in input order and combines them.
///
/// All masks must be `height x width`.
pub fn label_sequential<'a, I>(height: u32, width: u32, masks: I) -> Result<LabeledMasks, CryptomatteError>
where
    I: IntoIterator<Item = (&'a str, &'a Mask)>,
{
    let mut combiner = LabelCombiner::new(height, width);
    let mut assignments = Vec::new();
    for (index, (name, mask)) in masks.into_iter().enumerate() {
        let label = u32::try_from(index + 1).map_err(|_| CryptomatteError::LabelOverflow(u32::MAX))?;
        combiner.add(label, mask)?;
        assignments.push((name.to_string(), label));
    }
    Ok(LabeledMasks {
        labels: combiner.finish(),
        assignments,
    })
}

/// Combines masks under caller-chosen keys instead of input positions.
///
/// Keys must be non-zero; ties still go to the earlier entry.
pub fn label_with_keys<'a, I>(height: u32, width: u32, masks: I) -> Result<LabelMap, CryptomatteError>
where
    I: IntoIterator<Item = (u32, &'a Mask)>,
{
    let mut combiner = LabelCombiner::new(height, width);
    for (key, mask) in masks {
        combiner.add(key, mask)?;
    }
    Ok(combiner.finish())
}

/// Packs labels into RGB: red holds bits 0..8, green 8..16, blue 16..24.
///
/// Bits above 24 are dropped silently; use [`try_encode_ids_to_rgb`] to
/// reject such labels instead.
pub fn encode_ids_to_rgb(labels: &LabelMap) -> RgbImage {
    let mut raw = Vec::with_capacity(labels.as_slice().len() * 3);
    for &id in labels.as_slice() {
        raw.extend_from_slice(&[
            (id & 0xff) as u8,
            ((id >> 8) & 0xff) as u8,
            ((id >> 16) & 0xff) as u8,
        ]);
    }
    RgbImage::from_raw(labels.width(), labels.height(), raw)
        .unwrap_or_else(|| RgbImage::new(labels.width(), labels.height()))
}

/// Like [`encode_ids_to_rgb`], but fails on labels above [`MAX_PACKED_LABEL`].
pub fn try_encode_ids_to_rgb(labels: &LabelMap) -> Result<RgbImage, CryptomatteError> {
    if let Some(&id) = labels.as_slice().iter().find(|&&id| id > MAX_PACKED_LABEL) {
        return Err(CryptomatteError::LabelOverflow(id));
    }
    Ok(encode_ids_to_rgb(labels))
}

/// Inverse of [`encode_ids_to_rgb`]: `r + g * 256 + b * 65536`.
pub fn decode_rgb_to_ids(image: &RgbImage) -> LabelMap {
    let labels = image
        .pixels()
        .map(|p| u32::from(p[0]) | (u32::from(p[1]) << 8) | (u32::from(p[2]) << 16))
        .collect();
    LabelMap::from_vec(image.height(), image.width(), labels)
        .unwrap_or_else(|_| LabelMap::zeros(image.height(), image.width()))
}
