//! Layers and the image aggregate.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::channels::{identify_channels, NamingScheme};
use super::manifest::{resolve_manifest, Manifest};
use super::metadata::{group_header, Header};
use crate::error::CryptomatteError;

/// Size of the pixel data window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PixelWindow {
    pub height: u32,
    pub width: u32,
}

impl PixelWindow {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    pub fn pixel_count(&self) -> usize {
        self.height as usize * self.width as usize
    }
}

/// One Cryptomatte layer of an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub channel_names: Vec<String>,
    pub manifest: Manifest,
    pub naming_scheme: NamingScheme,
    /// The header layer id the metadata was found under.
    pub id_prefix: String,
}

/// An image with its Cryptomatte layers.
#[derive(Clone, Debug)]
pub struct CryptomatteImage {
    pub file_path: PathBuf,
    pub window: PixelWindow,
    pub layers: Vec<Layer>,
}

impl CryptomatteImage {
    /// Builds the aggregate from an image header and its channel names.
    ///
    /// Layers come out in layer-id order. Manifests are resolved relative to
    /// `file_path`. Two layer ids sharing one display name are rejected with
    /// [`CryptomatteError::DuplicateLayer`].
    pub fn from_header<'a, I>(
        file_path: &Path,
        window: PixelWindow,
        header: &Header,
        channel_names: I,
    ) -> Result<Self, CryptomatteError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let channel_names: Vec<&str> = channel_names.into_iter().collect();
        let mut layers = Vec::new();

        for (layer_id, meta) in group_header(header)? {
            let name = meta.layer_name().to_string();
            debug!("Processing layer metadata for '{}' (id {})", name, layer_id);
            if let Some(first) = layers.iter().find(|layer: &&Layer| layer.name == name) {
                return Err(CryptomatteError::DuplicateLayer {
                    layer: name,
                    first_id: first.id_prefix.clone(),
                    second_id: layer_id,
                    file: file_path.to_path_buf(),
                });
            }

            let layout = identify_channels(&name, channel_names.iter().copied());
            debug!(
                "Identified {} channels with naming scheme '{}'",
                layout.channel_names.len(),
                layout.naming_scheme.as_str()
            );

            let manifest = resolve_manifest(&meta, file_path)?;
            debug!("Manifest for '{}' contains {} objects", name, manifest.len());

            layers.push(Layer {
                name,
                channel_names: layout.channel_names,
                manifest,
                naming_scheme: layout.naming_scheme,
                id_prefix: layer_id,
            });
        }

        Ok(Self {
            file_path: file_path.to_path_buf(),
            window,
            layers,
        })
    }

    /// Looks a layer up by name.
    pub fn get_layer(&self, name: &str) -> Result<&Layer, CryptomatteError> {
        self.layers
            .iter()
            .find(|layer| layer.name == name)
            .ok_or_else(|| CryptomatteError::LayerNotFound {
                layer: name.to_string(),
                file: self.file_path.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matte::MetaValue;

    fn header() -> Header {
        let mut header = Header::new();
        header.insert("cryptomatte/aaa/name".into(), "CryptoObject".into());
        header.insert(
            "cryptomatte/aaa/manifest".into(),
            MetaValue::Bytes(br#"{"leaf": "3f800000"}"#.to_vec()),
        );
        header.insert("cryptomatte/bbb/name".into(), "CryptoMaterial".into());
        header
    }

    #[test]
    fn test_builds_layers_from_header() {
        let channels = [
            "CryptoObject00.R",
            "CryptoObject00.G",
            "CryptoObject00.B",
            "CryptoObject00.A",
            "CryptoMaterial00.r",
        ];
        let image = CryptomatteImage::from_header(
            Path::new("shot.exr"),
            PixelWindow::new(4, 8),
            &header(),
            channels,
        )
        .expect("image");

        assert_eq!(image.layers.len(), 2);
        let object = image.get_layer("CryptoObject").expect("layer");
        assert_eq!(object.id_prefix, "aaa");
        assert_eq!(object.channel_names.len(), 4);
        assert_eq!(object.manifest.len(), 1);

        let material = image.get_layer("CryptoMaterial").expect("layer");
        assert_eq!(material.naming_scheme, NamingScheme::Lower);
        assert!(material.manifest.is_empty());
    }

    #[test]
    fn test_duplicate_layer_name_is_error() {
        let mut header = header();
        header.insert("cryptomatte/ccc/name".into(), "CryptoObject".into());
        let err = CryptomatteImage::from_header(
            Path::new("shot.exr"),
            PixelWindow::new(1, 1),
            &header,
            std::iter::empty(),
        )
        .unwrap_err();
        match err {
            CryptomatteError::DuplicateLayer {
                layer,
                first_id,
                second_id,
                ..
            } => {
                assert_eq!(layer, "CryptoObject");
                assert_eq!(first_id, "aaa");
                assert_eq!(second_id, "ccc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_layer_is_error() {
        let image = CryptomatteImage::from_header(
            Path::new("shot.exr"),
            PixelWindow::new(1, 1),
            &Header::new(),
            std::iter::empty(),
        )
        .expect("image");
        let err = image.get_layer("CryptoObject").unwrap_err();
        assert!(matches!(err, CryptomatteError::LayerNotFound { .. }));
    }
}
