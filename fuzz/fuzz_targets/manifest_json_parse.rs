//! Fuzz target for manifest JSON parsing.
//!
//! Feeds arbitrary bytes to the manifest parser, which must reject bad
//! UTF-8, bad JSON and bad hex IDs with an error instead of a panic.
//!
//! Run with:
//!   cargo +nightly fuzz run manifest_json_parse

#![no_main]

use kriptomatte::matte::Manifest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Manifests of real productions stay well below this.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = Manifest::from_json_slice(data, "fuzz");
});
