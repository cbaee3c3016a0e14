//! The Cryptomatte decode engine.
//!
//! Everything in this module works on in-memory data: header metadata that
//! an image source has already extracted, and channel buffers it has
//! already read. Nothing here opens or writes files, with the single
//! exception of loading a sidecar manifest that a layer's metadata points
//! at.
//!
//! # Pipeline
//!
//! 1. [`group_header`] splits raw header keys into per-layer [`LayerMetadata`].
//! 2. [`resolve_manifest`] turns that metadata into a name → [`ObjectId`] [`Manifest`].
//! 3. [`identify_channels`] picks the ordered channel names of a layer.
//! 4. [`VisibilityIndex`] records which IDs occur in the [`ChannelStack`].
//! 5. [`compute_mask`] accumulates one object's coverage into a [`Mask`].
//! 6. [`LabelCombiner`] merges masks into a [`LabelMap`].
//! 7. [`colors_for`] turns a label map into an RGB preview.
//!
//! # Example
//!
//! ```
//! use kriptomatte::matte::{compute_mask, hash_name_to_id, ChannelStack};
//!
//! let id = hash_name_to_id("bunny");
//! // One pixel, one rank: ID channel then coverage channel.
//! let stack = ChannelStack::new(1, 1, 2, vec![id.value(), 1.0]).unwrap();
//! let mask = compute_mask(id, &stack);
//! assert_eq!(mask.get(0, 0), 255);
//! ```

mod buffers;
mod channels;
mod check;
mod combine;
mod hash;
mod id;
mod layer;
mod manifest;
mod mask;
mod metadata;
mod palette;
mod visibility;

pub use buffers::{ChannelStack, LabelMap, Mask};
pub use channels::{identify_channels, ChannelLayout, NamingScheme};
pub use check::{check_manifest, CheckIssue, ManifestCheckOptions, ManifestCheckReport};
pub use combine::{
    decode_rgb_to_ids, encode_ids_to_rgb, label_sequential, label_with_keys,
    try_encode_ids_to_rgb, LabelCombiner, LabeledMasks, MAX_PACKED_LABEL,
};
pub use hash::{hash_name_to_id, murmur3_32};
pub use id::{ByteOrder, ObjectId};
pub use layer::{CryptomatteImage, Layer, PixelWindow};
pub use manifest::{resolve_manifest, resolve_sidecar_path, Manifest};
pub use mask::{combine_max, compute_mask, coverage_for_rank};
pub use metadata::{group_header, Header, LayerMetadata, MetaValue, METADATA_PREFIXES};
pub use palette::{colors_for, colors_for_with, generate_colors, CyclingPalette, GoldenRatioPalette};
pub use visibility::{compute_visible_ids, VisibilityIndex};
