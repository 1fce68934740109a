//! Integration tests for loading documents and their resources from disk.

use gltf_io::accessor::AccessorView;
use gltf_io::flat::flatten;
use gltf_io::io::{load, save, LoadOptions, SaveOptions};
use gltf_io::model::{Asset, Buffer};
use gltf_io::resource::encode_data_uri;
use gltf_io::util::ErrorKind;

use tempfile::tempdir;

const TRIANGLE: &str = r#"{
    "asset": {"version": "2.0"},
    "scene": 0,
    "scenes": [{"nodes": [0]}],
    "nodes": [{"mesh": 0, "translation": [1, 0, 0]}],
    "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
    "buffers": [{"uri": "triangle.bin", "byteLength": 36}],
    "bufferViews": [{"buffer": 0, "byteLength": 36}],
    "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"}]
}"#;

fn triangle_bin() -> Vec<u8> {
    let values: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[test]
fn test_load_external_buffer() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("triangle.gltf"), TRIANGLE).unwrap();
    std::fs::write(dir.path().join("triangle.bin"), triangle_bin()).unwrap();

    let asset = load(dir.path().join("triangle.gltf"), &LoadOptions::default()).expect("load failed");
    assert_eq!(asset.base_dir.as_deref(), Some(dir.path()));

    let flat = flatten(&asset, None).unwrap();
    assert_eq!(flat.primitives[0].pos[1], [1.0, 0.0, 0.0]);
    // Non-indexed triangles get sequential indices.
    assert_eq!(flat.primitives[0].triangles, vec![[0, 1, 2]]);
    assert_eq!(flat.meshes[0].xform.w_axis.x, 1.0);
}

#[test]
fn test_missing_buffer() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("triangle.gltf");
    std::fs::write(&path, TRIANGLE).unwrap();

    let err = load(&path, &LoadOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);

    let asset = load(&path, &LoadOptions::default().with_skip_missing(true)).expect("skip_missing load failed");
    assert!(!asset.buffers[0].is_loaded());

    // Geometry of an unloaded buffer flattens to empty arrays.
    let flat = flatten(&asset, None).unwrap();
    assert_eq!(flat.primitives.len(), 1);
    assert!(flat.primitives[0].pos.is_empty());
    // No vertices were read, so no elements refer to them.
    assert!(flat.primitives[0].triangles.is_empty());
    assert_eq!(flat.num_triangles(), 0);
}

#[test]
fn test_float_bits_preserved() {
    let dir = tempdir().expect("Failed to create temp dir");
    let bits: [u32; 3] = [0x3f9d_f3b6, 0x0000_0001, 0xc2f6_e979];
    let bin: Vec<u8> = bits.iter().flat_map(|b| b.to_le_bytes()).collect();
    std::fs::write(dir.path().join("bits.bin"), &bin).unwrap();
    let doc = r#"{
        "asset": {"version": "2.0"},
        "buffers": [{"uri": "bits.bin", "byteLength": 12}],
        "bufferViews": [{"buffer": 0, "byteLength": 12}],
        "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "SCALAR"}]
    }"#;
    std::fs::write(dir.path().join("bits.gltf"), doc).unwrap();

    let asset = load(dir.path().join("bits.gltf"), &LoadOptions::default()).unwrap();
    let view = AccessorView::new(&asset, 0).unwrap();
    let read: Vec<u32> = view.to_scalars().iter().map(|v| v.to_bits()).collect();
    assert_eq!(read, bits.to_vec());
}

#[test]
fn test_sparse_accessor() {
    let dir = tempdir().expect("Failed to create temp dir");
    // Indices [1, 3] as bytes, padded, then values [5.0, 7.0].
    let mut bin = vec![1u8, 3, 0, 0];
    bin.extend(5.0f32.to_le_bytes());
    bin.extend(7.0f32.to_le_bytes());
    std::fs::write(dir.path().join("sparse.bin"), &bin).unwrap();
    let doc = r#"{
        "asset": {"version": "2.0"},
        "buffers": [{"uri": "sparse.bin", "byteLength": 12}],
        "bufferViews": [
            {"buffer": 0, "byteLength": 2},
            {"buffer": 0, "byteOffset": 4, "byteLength": 8}
        ],
        "accessors": [{
            "componentType": 5126, "count": 4, "type": "SCALAR",
            "sparse": {
                "count": 2,
                "indices": {"bufferView": 0, "componentType": 5121},
                "values": {"bufferView": 1}
            }
        }]
    }"#;
    std::fs::write(dir.path().join("sparse.gltf"), doc).unwrap();

    let asset = load(dir.path().join("sparse.gltf"), &LoadOptions::default()).unwrap();
    asset.validate().unwrap();
    let view = AccessorView::new(&asset, 0).unwrap();
    assert_eq!(view.to_scalars(), vec![0.0, 5.0, 0.0, 7.0]);
}

#[test]
fn test_text_save_embeds_buffer() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("embedded.gltf");

    let mut asset: Asset = Asset::from_json(TRIANGLE.as_bytes()).unwrap();
    asset.buffers[0] = Buffer::from_data(None, triangle_bin());
    save(&path, &asset, &SaveOptions::default()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(&encode_data_uri("application/octet-stream", &triangle_bin())));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1, "nothing but the document is written");

    let loaded = load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.buffers[0].data, triangle_bin());
}

#[test]
fn test_convert_text_to_binary() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut asset: Asset = Asset::from_json(TRIANGLE.as_bytes()).unwrap();
    asset.buffers[0] = Buffer::from_data(None, triangle_bin());

    let glb = dir.path().join("triangle.glb");
    save(&glb, &asset, &SaveOptions::default()).unwrap();

    // Binary is recognized by content, not extension.
    let renamed = dir.path().join("triangle.data");
    std::fs::rename(&glb, &renamed).unwrap();
    let loaded = load(&renamed, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.buffers[0].uri, None);
    assert_eq!(loaded.buffers[0].data, triangle_bin());
    assert_eq!(loaded.nodes.len(), 1);
}

#[test]
fn test_invalid_documents() {
    let dir = tempdir().expect("Failed to create temp dir");

    let path = dir.path().join("bad_ref.gltf");
    std::fs::write(&path, r#"{"asset": {"version": "2.0"}, "scenes": [{"nodes": [3]}]}"#).unwrap();
    let asset = load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(asset.validate().unwrap_err().kind(), ErrorKind::Schema);
    assert_eq!(flatten(&asset, None).unwrap_err().kind(), ErrorKind::Graph);

    let path = dir.path().join("cycle.gltf");
    std::fs::write(
        &path,
        r#"{"asset": {"version": "2.0"}, "scenes": [{"nodes": [0]}],
            "nodes": [{"children": [1]}, {"children": [0]}]}"#,
    )
    .unwrap();
    let asset = load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(flatten(&asset, None).unwrap_err().kind(), ErrorKind::Graph);
}

#[test]
fn test_huge_offsets_are_errors() {
    let dir = tempdir().expect("Failed to create temp dir");
    let data = encode_data_uri("application/octet-stream", &triangle_bin());

    let path = dir.path().join("view_offset.gltf");
    let doc = TRIANGLE
        .replace("\"triangle.bin\"", &format!("\"{data}\""))
        .replace("{\"buffer\": 0,", "{\"buffer\": 0, \"byteOffset\": 18446744073709551615,");
    std::fs::write(&path, doc).unwrap();
    let asset = load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(asset.validate().unwrap_err().kind(), ErrorKind::Schema);
    assert_eq!(flatten(&asset, None).unwrap_err().kind(), ErrorKind::Schema);
    assert!(AccessorView::new(&asset, 0).is_err());

    let path = dir.path().join("accessor_offset.gltf");
    let doc = TRIANGLE
        .replace("\"triangle.bin\"", &format!("\"{data}\""))
        .replace("{\"bufferView\": 0,", "{\"bufferView\": 0, \"byteOffset\": 18446744073709551614,");
    std::fs::write(&path, doc).unwrap();
    let asset = load(&path, &LoadOptions::default()).unwrap();
    asset.validate().unwrap();
    let err = flatten(&asset, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}
