//! Extraction through the PNG sink.

use kriptomatte::extract::{extract_all, ExtractOptions};
use kriptomatte::matte::{decode_rgb_to_ids, hash_name_to_id};
use kriptomatte::sink::PngSink;
use kriptomatte::source::MemoryImage;

fn source(dir: &std::path::Path) -> MemoryImage {
    let bunny = hash_name_to_id("bunny");
    let floor = hash_name_to_id("floor");
    let manifest = format!(
        r#"{{"bunny": "{}", "floor": "{}", "teapot": "{}", "???": "{}"}}"#,
        bunny.to_hex(),
        floor.to_hex(),
        hash_name_to_id("teapot").to_hex(),
        hash_name_to_id("???").to_hex(),
    );
    let mystery = hash_name_to_id("???").value();

    // 2x2 image, two ranks in one channel group
    MemoryImage::new(dir.join("beauty.exr"), 2, 2)
        .with_attribute("cryptomatte/0a1b2c3/name", "CryptoObject")
        .with_attribute("cryptomatte/0a1b2c3/hash", "MurmurHash3_32")
        .with_attribute("cryptomatte/0a1b2c3/manifest", manifest.into_bytes())
        .with_channel(
            "CryptoObject00.R",
            vec![bunny.value(), bunny.value(), floor.value(), mystery],
        )
        .with_channel("CryptoObject00.G", vec![1.0, 0.75, 1.0, 1.0])
        .with_channel("CryptoObject00.B", vec![0.0, floor.value(), 0.0, 0.0])
        .with_channel("CryptoObject00.A", vec![0.0, 0.25, 0.0, 0.0])
}

#[test]
fn writes_masks_into_layer_folder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let image = source(dir.path());

    let report = extract_all(&image, &mut PngSink, &ExtractOptions::default()).expect("extract");
    assert_eq!(report.written_count(), 3);

    let folder = dir.path().join("beauty_CryptoObject");
    let bunny = image::open(folder.join("bunny_mask.png")).expect("bunny").to_luma8();
    assert_eq!(bunny.as_raw(), &vec![255, 191, 0, 0]);

    let floor = image::open(folder.join("floor_mask.png")).expect("floor").to_luma8();
    assert_eq!(floor.as_raw(), &vec![0, 63, 255, 0]);

    // "???" sanitizes to nothing, so the file is named after the ID
    let fallback = folder.join(format!("{}_mask.png", hash_name_to_id("???").to_hex()));
    assert!(fallback.is_file());

    assert!(!folder.join("teapot_mask.png").exists());
}

#[test]
fn writes_preview_and_packed_labels() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("out");
    let image = source(dir.path());
    let opts = ExtractOptions {
        output_dir: Some(out.clone()),
        write_preview: true,
        write_label_image: true,
        ..Default::default()
    };

    let report = extract_all(&image, &mut PngSink, &opts).expect("extract");
    let layer = &report.layers[0];
    assert!(layer.preview.as_ref().is_some_and(|p| p.is_file()));

    // manifest order: "???" (1), bunny (2), floor (3)
    let packed = image::open(out.join("beauty_CryptoObject/_labels.png"))
        .expect("labels")
        .to_rgb8();
    let labels = decode_rgb_to_ids(&packed);
    assert_eq!(labels.as_slice(), &[2, 2, 3, 1]);
}
