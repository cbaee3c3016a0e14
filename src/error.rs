use std::path::PathBuf;
use thiserror::Error;

use crate::matte::ManifestCheckReport;

/// The main error type for kriptomatte operations.
#[derive(Debug, Error)]
pub enum CryptomatteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse manifest JSON from {origin}: {source}")]
    ManifestParse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Manifest from {origin} is not valid UTF-8: {source}")]
    ManifestUtf8 {
        origin: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Manifest entry '{name}' has an invalid ID '{value}' (expected up to 8 hex digits)")]
    InvalidManifestId { name: String, value: String },

    #[error("Metadata field '{field}' of layer '{layer}' is not valid UTF-8")]
    MetadataUtf8 { layer: String, field: String },

    #[error("Layer '{layer}' not found in {file}")]
    LayerNotFound { layer: String, file: PathBuf },

    #[error("Channel '{0}' not found in image")]
    MissingChannel(String),

    #[error("Buffer shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Mask size {actual_width}x{actual_height} does not match {width}x{height}")]
    MaskSizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Label 0 is reserved for background")]
    ReservedLabel,

    #[error("Label {0} does not fit in 24 bits")]
    LabelOverflow(u32),

    #[error("Failed to read OpenEXR file {path}: {source}")]
    Exr {
        path: PathBuf,
        #[source]
        source: exr::error::Error,
    },

    #[error("Image dimension {0} is out of range")]
    DimensionOverflow(usize),

    #[error("Layer name '{layer}' is used by both '{first_id}' and '{second_id}' in {file}")]
    DuplicateLayer {
        layer: String,
        first_id: String,
        second_id: String,
        file: PathBuf,
    },

    #[error("Failed to write image to {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Manifest check failed with {mismatch_count} mismatched ID(s)")]
    ManifestCheckFailed {
        mismatch_count: usize,
        report: ManifestCheckReport,
    },

    #[error("Failed to write JSON output: {0}")]
    JsonWrite(#[source] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
