//! Typed view of Cryptomatte header metadata.
//!
//! Image headers carry layer metadata under keys like
//! `cryptomatte/<layer-id>/<field>`. Values may arrive as text or as raw
//! bytes depending on the reader. This module validates them once and
//! exposes the fields the decoder cares about by name.

use std::collections::BTreeMap;

use crate::error::CryptomatteError;

/// Key prefixes under which layer metadata is recognized, checked in order.
pub const METADATA_PREFIXES: [&str; 2] = ["exr/cryptomatte/", "cryptomatte/"];

const FIELD_NAME: &str = "name";
const FIELD_MANIFEST: &str = "manifest";
const FIELD_MANIFEST_FILE: &str = "manif_file";

/// A header value as delivered by an image source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    Bytes(Vec<u8>),
}

impl MetaValue {
    /// Returns the raw bytes of the value.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            MetaValue::Text(s) => s.as_bytes(),
            MetaValue::Bytes(b) => b,
        }
    }

    /// Returns the value as text, decoding bytes as UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::Bytes(b) => std::str::from_utf8(b).ok(),
        }
    }

    fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<Vec<u8>> for MetaValue {
    fn from(value: Vec<u8>) -> Self {
        MetaValue::Bytes(value)
    }
}

/// A full image header: key → value.
pub type Header = BTreeMap<String, MetaValue>;

/// Metadata for one Cryptomatte layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerMetadata {
    /// The layer id that correlates header keys (e.g. `a1b2c3d`).
    pub id: String,
    /// Which of [`METADATA_PREFIXES`] the keys were found under.
    pub prefix: String,
    /// Display name of the layer; also the channel name stem.
    pub display_name: Option<String>,
    /// Embedded manifest JSON payload.
    pub manifest_bytes: Option<Vec<u8>>,
    /// Sidecar manifest path, relative to the image file.
    pub manifest_file_ref: Option<String>,
    /// Fields the decoder does not interpret (`hash`, `conversion`, ...).
    pub extra: BTreeMap<String, MetaValue>,
}

impl LayerMetadata {
    /// The name used for channel lookup and output folders.
    ///
    /// Falls back to the layer id when no `name` field is present.
    pub fn layer_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    fn set_field(&mut self, field: &str, value: &MetaValue) -> Result<(), CryptomatteError> {
        match field {
            FIELD_NAME => {
                self.display_name = Some(self.decode_text(field, value)?);
            }
            FIELD_MANIFEST_FILE => {
                // An empty reference means "no sidecar".
                if !value.is_empty() {
                    self.manifest_file_ref = Some(self.decode_text(field, value)?);
                }
            }
            FIELD_MANIFEST => {
                if !value.is_empty() {
                    self.manifest_bytes = Some(value.as_bytes().to_vec());
                }
            }
            other => {
                self.extra.insert(other.to_string(), value.clone());
            }
        }
        Ok(())
    }

    fn decode_text(&self, field: &str, value: &MetaValue) -> Result<String, CryptomatteError> {
        value
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| CryptomatteError::MetadataUtf8 {
                layer: self.id.clone(),
                field: field.to_string(),
            })
    }
}

/// Groups Cryptomatte header keys by layer id.
///
/// Keys outside the known prefixes are ignored. Only the first path
/// segment after the layer id is used as the field name.
pub fn group_header(header: &Header) -> Result<BTreeMap<String, LayerMetadata>, CryptomatteError> {
    let mut layers: BTreeMap<String, LayerMetadata> = BTreeMap::new();

    for (key, value) in header {
        let Some((prefix, rest)) = METADATA_PREFIXES
            .iter()
            .find_map(|p| key.strip_prefix(p).map(|rest| (*p, rest)))
        else {
            continue;
        };

        let mut parts = rest.split('/');
        let layer_id = parts.next().unwrap_or_default();
        let field = parts.next().unwrap_or_default();

        let meta = layers
            .entry(layer_id.to_string())
            .or_insert_with(|| LayerMetadata {
                id: layer_id.to_string(),
                ..Default::default()
            });
        meta.prefix = prefix.to_string();
        meta.set_field(field, value)?;
    }

    Ok(layers)
}
