//! Fuzz target for header grouping and manifest resolution.
//!
//! Interprets the input as a sequence of `key=value` lines, groups them into
//! layer metadata and resolves each layer's embedded manifest.
//!
//! Run with:
//!   cargo +nightly fuzz run header_group

#![no_main]

use std::path::Path;

use kriptomatte::matte::{group_header, resolve_manifest, Header, MetaValue};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let mut header = Header::new();
    for line in data.split(|&b| b == b'\n') {
        let Some(split) = line.iter().position(|&b| b == b'=') else {
            continue;
        };
        let key = String::from_utf8_lossy(&line[..split]).into_owned();
        header.insert(key, MetaValue::Bytes(line[split + 1..].to_vec()));
    }

    let Ok(layers) = group_header(&header) else {
        return;
    };
    for meta in layers.values() {
        // Sidecar references resolve against a path with no real directory.
        let _ = resolve_manifest(meta, Path::new("fuzz/nonexistent.exr"));
    }
});
