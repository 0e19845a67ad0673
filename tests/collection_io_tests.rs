//! Tests for collection file loading and saving.

use collection_merge::collection::Collection;
use serde_json::json;
use tempfile::TempDir;

fn sample() -> Collection {
    Collection::new(json!({
        "_id": "C1",
        "colName": "Petstore",
        "settings": {},
        "folders": [{"_id": "F1", "name": "Pets", "sortNum": 1}],
        "requests": [{"_id": "R1", "name": "List", "method": "GET", "url": "/pets"}]
    }))
}

#[test]
fn plain_json_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("collection.json");

    sample().write_to_file(&path, false).expect("write");
    let loaded = Collection::from_file(&path).expect("load");

    assert_eq!(loaded, sample());
}

#[test]
fn gzip_round_trip_detected_by_magic_bytes() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("collection.json.gz");

    sample().write_to_file(&path, true).expect("write");

    // The file on disk must actually be gzip, not plain JSON.
    let raw = std::fs::read(&path).expect("read bytes");
    assert_eq!(&raw[..2], &[0x1f, 0x8b]);

    let loaded = Collection::from_file(&path).expect("load");
    assert_eq!(loaded, sample());
}

#[test]
fn write_creates_intermediate_directories() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("deeper").join("out.json");

    sample().write_to_file(&path, false).expect("write");

    assert!(path.exists());
}

#[test]
fn output_is_indented_with_four_spaces() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("collection.json");

    sample().write_to_file(&path, false).expect("write");
    let text = std::fs::read_to_string(&path).expect("read");

    assert!(text.contains("\n    \"folders\""));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("does-not-exist.json");

    let err = Collection::from_file(&path).expect_err("should fail");

    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn invalid_json_is_a_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{not json at all").expect("write fixture");

    let err = Collection::from_file(&path).expect_err("should fail");

    assert!(err.to_string().contains("not valid JSON"));
}
