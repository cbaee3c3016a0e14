//! OpenEXR image source.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use exr::image::FlatSamples;
use exr::meta::attribute::{AttributeValue, Text};
use tracing::{debug, info, warn};

use super::{stack_planes, ImageSource};
use crate::error::CryptomatteError;
use crate::matte::{ChannelStack, Header, MetaValue, PixelWindow};

/// An OpenEXR file, decoded when opened.
///
/// Text attributes of the file and of every part are merged into one
/// header. Channels are upcast to `f32` and kept as planes of the data
/// window. Parts whose data window differs from the first part are skipped.
#[derive(Clone, Debug)]
pub struct ExrImage {
    path: PathBuf,
    window: PixelWindow,
    header: Header,
    channels: BTreeMap<String, Vec<f32>>,
}

impl ExrImage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CryptomatteError> {
        let path = path.as_ref();
        info!("Reading {}", path.display());
        let image = exr::prelude::read_all_flat_layers_from_file(path).map_err(|source| {
            CryptomatteError::Exr {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let mut header = Header::new();
        insert_text_attributes(&mut header, &image.attributes.other);

        let mut data_window: Option<PixelWindow> = None;
        let mut channels = BTreeMap::new();
        for (index, layer) in image.layer_data.iter().enumerate() {
            insert_text_attributes(&mut header, &layer.attributes.other);

            let size = PixelWindow::new(dimension(layer.size.1)?, dimension(layer.size.0)?);
            let window = *data_window.get_or_insert(size);
            if size != window {
                warn!(
                    "Skipping part {}: data window {}x{} differs from {}x{}",
                    index, size.width, size.height, window.width, window.height
                );
                continue;
            }

            for channel in &layer.channel_data.list {
                let name = channel.name.to_string();
                let plane = upcast(&channel.sample_data);
                if channels.insert(name.clone(), plane).is_some() {
                    warn!("Channel '{}' appears in several parts, keeping the last", name);
                }
            }
        }

        let window = data_window.unwrap_or_else(|| PixelWindow::new(0, 0));
        debug!(
            "Decoded {} channels over {}x{} pixels",
            channels.len(),
            window.width,
            window.height
        );

        Ok(Self {
            path: path.to_path_buf(),
            window,
            header,
            channels,
        })
    }
}

impl ImageSource for ExrImage {
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
        stack_planes(self.window, &self.channels, names)
    }
}

/// Copies text attributes into the header as raw bytes.
fn insert_text_attributes<'a, I>(header: &mut Header, attributes: I)
where
    I: IntoIterator<Item = (&'a Text, &'a AttributeValue)>,
{
    for (key, value) in attributes {
        match value {
            AttributeValue::Text(text) => {
                header.insert(key.to_string(), MetaValue::Bytes(text.as_slice().to_vec()));
            }
            _ => debug!("Ignoring non-text attribute '{}'", key),
        }
    }
}

fn upcast(samples: &FlatSamples) -> Vec<f32> {
    match samples {
        FlatSamples::F16(values) => values.iter().map(|value| value.to_f32()).collect(),
        FlatSamples::F32(values) => values.clone(),
        FlatSamples::U32(values) => values.iter().map(|&value| value as f32).collect(),
    }
}

fn dimension(value: usize) -> Result<u32, CryptomatteError> {
    u32::try_from(value).map_err(|_| CryptomatteError::DimensionOverflow(value))
}
