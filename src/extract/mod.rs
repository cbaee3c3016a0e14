//! Mask extraction: from an image source to files in an image sink.
//!
//! For every Cryptomatte layer the channels are read once, then every
//! manifest object (in name order) gets its mask composed and written to
//! `<output>/<file-stem>_<layer>/<object>_mask.png`. Objects whose mask is
//! uniform are skipped.

mod report;

pub use report::{ExtractReport, LayerReport, WrittenMask};

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::CryptomatteError;
use crate::matte::{
    colors_for, compute_mask, label_sequential, try_encode_ids_to_rgb, Layer, Mask, ObjectId,
    VisibilityIndex,
};
use crate::sink::ImageSink;
use crate::source::ImageSource;

const PREVIEW_FILE: &str = "_preview.png";
const LABEL_IMAGE_FILE: &str = "_labels.png";

/// Options for extraction.
#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Where layer folders are created. Defaults to the input's directory.
    pub output_dir: Option<PathBuf>,
    /// Skip composing masks for IDs absent from the ID channels.
    pub skip_invisible: bool,
    /// Also write a colored label preview per layer.
    pub write_preview: bool,
    /// Also write the 24-bit packed label image per layer.
    pub write_label_image: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            skip_invisible: true,
            write_preview: false,
            write_label_image: false,
        }
    }
}

/// Extracts the masks of every Cryptomatte layer in `source`.
#[tracing::instrument(skip_all, fields(input = %source.path().display()))]
pub fn extract_all(
    source: &dyn ImageSource,
    sink: &mut dyn ImageSink,
    opts: &ExtractOptions,
) -> Result<ExtractReport, CryptomatteError> {
    let input = source.path().to_path_buf();
    info!("Starting extraction for {}", input.display());

    let image = source.load_image()?;
    let output_dir = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| input.parent().map(Path::to_path_buf).unwrap_or_default());
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut layers = Vec::with_capacity(image.layers.len());
    for layer in &image.layers {
        let folder = output_dir.join(format!("{}_{}", stem, layer.name));
        layers.push(extract_layer(source, layer, &folder, sink, opts)?);
    }

    info!("Extraction complete");
    Ok(ExtractReport {
        input,
        output_dir,
        layers,
    })
}

/// Extracts the masks of a single layer into `folder`.
#[tracing::instrument(skip_all, fields(layer = %layer.name))]
pub fn extract_layer(
    source: &dyn ImageSource,
    layer: &Layer,
    folder: &Path,
    sink: &mut dyn ImageSink,
    opts: &ExtractOptions,
) -> Result<LayerReport, CryptomatteError> {
    info!("Processing layer: {}", layer.name);
    let stack = source.read_channels(&layer.channel_names)?;
    let visibility = opts.skip_invisible.then(|| VisibilityIndex::build(&stack));
    let keep_masks = opts.write_preview || opts.write_label_image;

    let mut report = LayerReport {
        name: layer.name.clone(),
        folder: folder.to_path_buf(),
        channel_count: stack.channels(),
        manifest_entries: layer.manifest.len(),
        ..Default::default()
    };
    let mut kept: Vec<(&str, Mask)> = Vec::new();

    for (name, id) in layer.manifest.iter() {
        if visibility.as_ref().is_some_and(|index| !index.contains(id)) {
            debug!("Skipping '{}': ID {} not present in image", name, id);
            report.skipped_invisible.push(name.to_string());
            continue;
        }

        let mask = compute_mask(id, &stack);
        if mask.is_empty() {
            debug!("Skipping empty mask for '{}'", name);
            report.skipped_empty.push(name.to_string());
            continue;
        }

        let path = folder.join(format!("{}_mask.png", output_stem(name, id)));
        sink.write(&path, &DynamicImage::ImageLuma8(mask.to_gray_image()))?;
        report.written.push(WrittenMask {
            name: name.to_string(),
            id: id.to_hex(),
            path,
        });

        if keep_masks {
            kept.push((name, mask));
        }
    }

    if keep_masks && !kept.is_empty() {
        let labeled = label_sequential(
            stack.height(),
            stack.width(),
            kept.iter().map(|(name, mask)| (*name, mask)),
        )?;

        if opts.write_preview {
            let path = folder.join(PREVIEW_FILE);
            sink.write(&path, &DynamicImage::ImageRgb8(colors_for(&labeled.labels)))?;
            report.preview = Some(path);
        }
        if opts.write_label_image {
            let path = folder.join(LABEL_IMAGE_FILE);
            let packed = try_encode_ids_to_rgb(&labeled.labels)?;
            sink.write(&path, &DynamicImage::ImageRgb8(packed))?;
            report.label_image = Some(path);
        }
    }

    Ok(report)
}

/// Keeps alphanumerics, spaces, dots and underscores, then trims.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// File name stem for an object; falls back to the ID when nothing survives sanitizing.
fn output_stem(name: &str, id: ObjectId) -> String {
    let safe = sanitize_name(name);
    if safe.is_empty() || safe.chars().all(|c| c == '.') {
        id.to_hex()
    } else {
        safe
    }
}
