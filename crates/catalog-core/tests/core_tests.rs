use std::fs;
use tempfile::TempDir;

use catalog_core::types::CatalogEntry;
use catalog_core::{CatalogMapping, Error};

#[test]
fn load_mapping_round_trip_through_artifact() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("processed/mapping.json");
    let entries = vec![
        CatalogEntry { position: 0, id: 101, name: "centrifugal pump".into() },
        CatalogEntry { position: 1, id: 205, name: "rotary compressor".into() },
    ];
    CatalogMapping::from_entries(entries.clone()).unwrap().save(&path).expect("save");

    let mapping = CatalogMapping::load(&path).expect("load");
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.entry_at(1).unwrap(), &entries[1]);
}

#[test]
fn load_missing_file_is_load_error() {
    let tmp = TempDir::new().unwrap();
    let err = CatalogMapping::load(&tmp.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, Error::Load(_)), "got {err}");
}

#[test]
fn load_malformed_json_is_load_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("mapping.json");
    fs::write(&path, r#"{"entries": [{"position": 0, "id": "x"}]}"#).unwrap();
    let err = CatalogMapping::load(&path).unwrap_err();
    assert!(matches!(err, Error::Load(_)), "got {err}");
}

#[test]
fn load_empty_catalog_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("mapping.json");
    fs::write(&path, r#"{"entries": []}"#).unwrap();
    assert!(matches!(CatalogMapping::load(&path), Err(Error::Load(_))));
}
