//! End-to-end decode scenarios on in-memory data.

use std::fs;
use std::path::Path;

use kriptomatte::matte::{
    compute_mask, group_header, label_sequential, resolve_manifest, ChannelStack, Header,
    LayerMetadata, Mask, MetaValue,
};
use kriptomatte::CryptomatteError;

const LEAF_GROUND: &str = r#"{"leaf": "3f800000", "ground": "40000000"}"#;

fn embedded(json: &str) -> LayerMetadata {
    LayerMetadata {
        id: "abc".into(),
        display_name: Some("CryptoObject".into()),
        manifest_bytes: Some(json.as_bytes().to_vec()),
        ..Default::default()
    }
}

#[test]
fn leaf_and_ground_scenario() {
    let manifest = resolve_manifest(&embedded(LEAF_GROUND), Path::new("shot.exr")).expect("manifest");
    let leaf = manifest.get("leaf").expect("leaf");
    let ground = manifest.get("ground").expect("ground");
    assert_eq!(leaf.value(), 1.0);
    assert_eq!(ground.value(), 2.0);

    // 2x2, one rank; leaf at (0,0) with half coverage, ground elsewhere
    let stack = ChannelStack::new(
        2,
        2,
        2,
        vec![1.0, 0.5, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0],
    )
    .expect("stack");

    let mask = compute_mask(leaf, &stack);
    assert_eq!(mask.get(0, 0), 127);
    assert_eq!(mask.get(0, 1), 0);
    assert_eq!(mask.get(1, 0), 0);
    assert_eq!(mask.get(1, 1), 0);
}

#[test]
fn overlapping_masks_second_wins() {
    let first = Mask::filled(3, 3, 100);
    let second = Mask::filled(3, 3, 200);
    let result = label_sequential(3, 3, [("first", &first), ("second", &second)]).expect("labels");
    assert!(result.labels.as_slice().iter().all(|&l| l == 2));
    assert!(!result.labels.as_slice().contains(&1));
}

#[test]
fn sidecar_takes_precedence_over_embedded() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("manifests")).expect("mkdir");
    fs::write(
        dir.path().join("manifests/objects.json"),
        r#"{"sidecar_only": "3f800000"}"#,
    )
    .expect("write sidecar");

    let meta = LayerMetadata {
        manifest_file_ref: Some("manifests/objects.json".into()),
        ..embedded(LEAF_GROUND)
    };
    let manifest = resolve_manifest(&meta, &dir.path().join("shot.exr")).expect("manifest");
    assert_eq!(manifest.len(), 1);
    assert!(manifest.get("sidecar_only").is_some());
}

#[test]
fn missing_sidecar_falls_back_to_embedded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let meta = LayerMetadata {
        manifest_file_ref: Some("missing.json".into()),
        ..embedded(LEAF_GROUND)
    };
    let manifest = resolve_manifest(&meta, &dir.path().join("shot.exr")).expect("manifest");
    assert_eq!(manifest.len(), 2);
}

#[test]
fn corrupt_sidecar_is_hard_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("objects.json"), "{\"a\": ").expect("write sidecar");

    let meta = LayerMetadata {
        manifest_file_ref: Some("objects.json".into()),
        ..embedded(LEAF_GROUND)
    };
    let err = resolve_manifest(&meta, &dir.path().join("shot.exr")).unwrap_err();
    assert!(matches!(err, CryptomatteError::ManifestParse { .. }));
}

#[test]
fn byte_valued_sidecar_reference_resolves_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("manifests")).expect("mkdir");
    fs::write(
        dir.path().join("manifests/objects.json"),
        r#"{"bunny": "13851a76"}"#,
    )
    .expect("write sidecar");

    let mut header = Header::new();
    header.insert(
        "exr/cryptomatte/abc/name".into(),
        MetaValue::Bytes(b"CryptoObject".to_vec()),
    );
    header.insert(
        "exr/cryptomatte/abc/manif_file".into(),
        MetaValue::Bytes(b"manifests/objects.json".to_vec()),
    );

    let layers = group_header(&header).expect("group");
    let meta = &layers["abc"];
    assert_eq!(meta.manifest_file_ref.as_deref(), Some("manifests/objects.json"));

    let manifest = resolve_manifest(meta, &dir.path().join("shot.exr")).expect("manifest");
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.get("bunny").map(|id| id.bits()), Some(0x1385_1a76));
}

#[test]
fn embedded_manifest_with_invalid_utf8_is_error() {
    let meta = LayerMetadata {
        id: "abc".into(),
        manifest_bytes: Some(vec![b'{', b'"', 0xff, 0xfe, b'"', b':', b'"', b'1', b'"', b'}']),
        ..Default::default()
    };
    let err = resolve_manifest(&meta, Path::new("shot.exr")).unwrap_err();
    assert!(matches!(err, CryptomatteError::ManifestUtf8 { .. }));
}
