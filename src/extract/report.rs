//! Extraction report types.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Summary of one extraction run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ExtractReport {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub layers: Vec<LayerReport>,
}

impl ExtractReport {
    /// Total masks written across all layers.
    pub fn written_count(&self) -> usize {
        self.layers.iter().map(|l| l.written.len()).sum()
    }

    /// Total objects skipped because their mask was empty or absent.
    pub fn skipped_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.skipped_empty.len() + l.skipped_invisible.len())
            .sum()
    }
}

/// What happened to one layer.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LayerReport {
    pub name: String,
    pub folder: PathBuf,
    pub channel_count: usize,
    pub manifest_entries: usize,
    pub written: Vec<WrittenMask>,
    /// Objects whose ID never appears in the ID channels.
    pub skipped_invisible: Vec<String>,
    /// Objects that appear but whose mask came out uniform.
    pub skipped_empty: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_image: Option<PathBuf>,
}

/// A mask that was handed to the sink.
#[derive(Clone, Debug, Serialize)]
pub struct WrittenMask {
    pub name: String,
    pub id: String,
    pub path: PathBuf,
}

impl fmt::Display for ExtractReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extracted {}", self.input.display())?;
        if self.layers.is_empty() {
            return writeln!(f, "  no Cryptomatte layers found");
        }
        for layer in &self.layers {
            writeln!(
                f,
                "  {}: {} channels, {} manifest entries, {} masks written, {} skipped",
                layer.name,
                layer.channel_count,
                layer.manifest_entries,
                layer.written.len(),
                layer.skipped_empty.len() + layer.skipped_invisible.len()
            )?;
            if let Some(preview) = &layer.preview {
                writeln!(f, "    preview: {}", preview.display())?;
            }
        }
        Ok(())
    }
}
