//! Manifest resolution: object name → [`ObjectId`].
//!
//! A layer's manifest lives either in a sidecar JSON file referenced by the
//! `manif_file` field, or embedded in the `manifest` field. Both hold a JSON
//! object mapping names to hex-encoded ID bits. A missing manifest is not
//! an error (the layer simply has no known objects), but a manifest that
//! is present and unparsable is.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info, warn};

use super::id::ObjectId;
use super::metadata::LayerMetadata;
use crate::error::CryptomatteError;

/// An immutable name → ID mapping for one layer.
///
/// Iteration is in name order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, ObjectId>,
}

impl Manifest {
    /// Converts raw `name → hex` entries into a manifest.
    pub fn from_raw(raw: BTreeMap<String, String>) -> Result<Self, CryptomatteError> {
        let mut entries = BTreeMap::new();
        for (name, hex) in raw {
            let id = ObjectId::from_hex(&hex).ok_or_else(|| CryptomatteError::InvalidManifestId {
                name: name.clone(),
                value: hex.clone(),
            })?;
            entries.insert(name, id);
        }
        Ok(Self { entries })
    }

    /// Parses manifest JSON text. `origin` describes where it came from for errors.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, CryptomatteError> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(|source| CryptomatteError::ManifestParse {
                origin: origin.to_string(),
                source,
            })?;
        Self::from_raw(raw)
    }

    /// Parses manifest JSON from raw bytes, which must be UTF-8.
    ///
    /// Useful for fuzzing and for embedded manifests delivered as bytes.
    pub fn from_json_slice(bytes: &[u8], origin: &str) -> Result<Self, CryptomatteError> {
        let text = std::str::from_utf8(bytes).map_err(|source| CryptomatteError::ManifestUtf8 {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_json_str(text, origin)
    }

    /// Reads a sidecar manifest file.
    pub fn read_file(path: &Path) -> Result<Self, CryptomatteError> {
        let bytes = fs::read(path)?;
        Self::from_json_slice(&bytes, &path.display().to_string())
    }

    /// Looks up the ID of a named object.
    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.entries.get(name).copied()
    }

    /// Iterates `(name, id)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ObjectId)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Iterates object names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ObjectId)> for Manifest {
    fn from_iter<T: IntoIterator<Item = (String, ObjectId)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Resolves a sidecar reference against the directory of the image file.
///
/// References containing a backslash are rejected: sidecar paths must use
/// forward slashes. The joined path is normalized lexically.
pub fn resolve_sidecar_path(image_path: &Path, reference: &str) -> Option<PathBuf> {
    if reference.contains('\\') {
        return None;
    }
    let base = image_path.parent().unwrap_or_else(|| Path::new(""));
    Some(normalize(&base.join(reference)))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Builds the manifest of a layer from its metadata.
///
/// A sidecar file takes precedence over an embedded manifest. A sidecar
/// that cannot be located is logged and the embedded manifest is tried
/// instead. With neither available the manifest is empty.
pub fn resolve_manifest(meta: &LayerMetadata, image_path: &Path) -> Result<Manifest, CryptomatteError> {
    if let Some(reference) = &meta.manifest_file_ref {
        info!("Sidecar manifest detected: {}", reference);
        match resolve_sidecar_path(image_path, reference) {
            Some(full_path) if full_path.is_file() => {
                debug!("Loading sidecar manifest from {}", full_path.display());
                let manifest = Manifest::read_file(&full_path)?;
                debug!("Loaded {} entries from sidecar", manifest.len());
                return Ok(manifest);
            }
            Some(full_path) => {
                error!("Unable to find manifest file: {}", full_path.display());
            }
            None => {
                error!(
                    "Invalid sidecar path '{}' (back-slashes not allowed)",
                    reference
                );
            }
        }
    }

    if let Some(bytes) = &meta.manifest_bytes {
        debug!("Decoding embedded manifest ({} bytes)", bytes.len());
        let origin = format!("embedded manifest of layer '{}'", meta.layer_name());
        let manifest = Manifest::from_json_slice(bytes, &origin)?;
        debug!("Parsed embedded manifest with {} entries", manifest.len());
        return Ok(manifest);
    }

    warn!("No manifest found for layer '{}'", meta.layer_name());
    Ok(Manifest::default())
}
