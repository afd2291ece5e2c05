// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

use planet_poi_core::store::{Coordinates, ImportMode, Item, Poi, PoiEdit, PoiStore};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn shards() -> Poi {
    Poi::new("HIP 36601", "C 3 b", Some(Coordinates::new(-67.5, 127.2))).with_description("Shards")
}

#[test]
fn test_tree_survives_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("poi.json");

    let (folder, poi) = {
        let mut store = PoiStore::open(&path);
        let folder = store.create_folder(None, "Exobiology").unwrap();
        let poi = store.add_poi(Some(folder), shards()).unwrap();
        store.add_poi(None, Poi::new("Sol", "", None)).unwrap();
        store.toggle_active(poi).unwrap();
        (folder, poi)
    };

    let store = PoiStore::open(&path);
    assert_eq!(store.tree().len(), 3);
    assert_eq!(store.tree().root_children().len(), 2);

    let folder_id = store.tree().root_children()[0];
    match store.tree().get(folder_id) {
        Some(Item::Folder(f)) => assert_eq!(f.name, "Exobiology"),
        other => panic!("expected folder, got {:?}", other),
    }
    let child = store.tree().children(Some(folder_id)).unwrap()[0];
    let loaded = store.tree().poi(child).unwrap();
    assert_eq!(loaded.system, "HIP 36601");
    assert_eq!(loaded.body, "C 3 b");
    assert_eq!(loaded.coords, Some(Coordinates::new(-67.5, 127.2)));
    assert!(!loaded.active);

    // Ids are assigned in pre-order on load, matching creation order here.
    assert_eq!(folder_id, folder);
    assert_eq!(child, poi);
}

#[test]
fn test_file_format_is_tagged_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("poi.json");
    let mut store = PoiStore::open(&path);
    let folder = store.create_folder(None, "Trip").unwrap();
    store.add_poi(Some(folder), shards()).unwrap();
    store.add_poi(None, Poi::new("Sol", "", None)).unwrap();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let items = doc.as_array().unwrap();
    assert_eq!(items[0]["type"], "folder");
    assert_eq!(items[0]["name"], "Trip");
    assert_eq!(items[0]["children"][0]["type"], "poi");
    assert_eq!(items[0]["children"][0]["lat"], -67.5);
    assert_eq!(items[1]["lat"], "");
    assert_eq!(items[1]["lon"], "");
    assert_eq!(items[1]["active"], true);
}

#[test]
fn test_no_temp_files_left_behind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("poi.json");
    let mut store = PoiStore::open(&path);
    for i in 0..5 {
        store
            .add_poi(None, shards().with_description(format!("stop {}", i)))
            .unwrap();
    }

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["poi.json".to_string()]);
}

#[test]
fn test_missing_parent_directory_is_created() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("poi.json");
    let mut store = PoiStore::open(&path);
    store.add_poi(None, shards()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_corrupt_file_opens_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("poi.json");
    fs::write(&path, "{ not json").unwrap();

    let store = PoiStore::open(&path);
    assert!(store.tree().is_empty());
}

#[test]
fn test_edit_persists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("poi.json");
    let mut store = PoiStore::open(&path);
    let id = store.add_poi(None, shards()).unwrap();
    store
        .edit_poi(
            id,
            PoiEdit {
                coords: Some(None),
                notes: Some("Bring a scanner".into()),
                ..Default::default()
            },
        )
        .unwrap();

    let reloaded = PoiStore::open(&path);
    let poi = reloaded.tree().poi(id).unwrap();
    assert_eq!(poi.coords, None);
    assert_eq!(poi.notes, "Bring a scanner");
    assert_eq!(poi.description, "Shards");
}

#[test]
fn test_export_then_import_merge_and_replace() {
    let dir = tempdir().unwrap();
    let mut source = PoiStore::open(dir.path().join("source.json"));
    let folder = source.create_folder(None, "Shared").unwrap();
    source.add_poi(Some(folder), shards()).unwrap();
    let export_path = dir.path().join("export.json");
    source.export_to(&export_path).unwrap();

    let mut target = PoiStore::open(dir.path().join("target.json"));
    target.add_poi(None, Poi::new("Sol", "", None)).unwrap();

    let count = target.import_from(&export_path, ImportMode::Merge).unwrap();
    assert_eq!(count, 1);
    assert_eq!(target.tree().len(), 3);
    assert_eq!(target.tree().root_children().len(), 2);

    let count = target.import_from(&export_path, ImportMode::Replace).unwrap();
    assert_eq!(count, 1);
    assert_eq!(target.tree().len(), 2);

    let reloaded = PoiStore::open(dir.path().join("target.json"));
    assert_eq!(reloaded.tree().len(), 2);
}

#[test]
fn test_replace_import_retires_old_handles() {
    let dir = tempdir().unwrap();
    let mut source = PoiStore::open(dir.path().join("source.json"));
    source
        .add_poi(None, Poi::new("Colonia", "", None).with_description("imported"))
        .unwrap();
    let export_path = dir.path().join("export.json");
    source.export_to(&export_path).unwrap();

    let mut target = PoiStore::open(dir.path().join("target.json"));
    let old = target.add_poi(None, shards()).unwrap();
    target.import_from(&export_path, ImportMode::Replace).unwrap();

    assert!(target.tree().get(old).is_none());
    assert!(target.toggle_active(old).is_err());
    assert!(!target.delete(old).unwrap());

    let remaining: Vec<_> = target.tree().pois().map(|(_, p)| p.description.clone()).collect();
    assert_eq!(remaining, vec!["imported".to_string()]);
    assert!(target.tree().pois().all(|(_, p)| p.active));
}

#[test]
fn test_import_of_missing_file_fails_without_change() {
    let dir = tempdir().unwrap();
    let mut store = PoiStore::open(dir.path().join("poi.json"));
    store.add_poi(None, shards()).unwrap();

    assert!(store
        .import_from(dir.path().join("nope.json"), ImportMode::Replace)
        .is_err());
    assert_eq!(store.tree().len(), 1);
}

#[test]
fn test_body_queries() {
    let dir = tempdir().unwrap();
    let mut store = PoiStore::open(dir.path().join("poi.json"));
    let folder = store.create_folder(None, "F").unwrap();
    let a = store.add_poi(Some(folder), shards()).unwrap();
    let b = store.add_poi(None, shards().with_description("Second")).unwrap();
    store.add_poi(None, Poi::new("HIP 36601", "C 4", None)).unwrap();
    store.set_active(b, false).unwrap();

    let on_body: Vec<_> = store.pois_on_body("HIP 36601 C 3 b").map(|(id, _)| id).collect();
    assert_eq!(on_body, vec![a, b]);
    let active: Vec<_> = store.active_pois_on_body("HIP 36601 C 3 b").map(|(id, _)| id).collect();
    assert_eq!(active, vec![a]);
    assert_eq!(store.pois_in_system("HIP 36601").count(), 3);
}

#[test]
fn test_identity_lookup_and_census() {
    let dir = tempdir().unwrap();
    let mut store = PoiStore::open(dir.path().join("poi.json"));
    let outer = store.create_folder(None, "Colonia").unwrap();
    let inner = store.create_folder(Some(outer), "Biology").unwrap();
    let deep = store.add_poi(Some(inner), shards()).unwrap();
    store.add_poi(Some(outer), shards().with_description("Second")).unwrap();

    // Two equal-valued POIs are still told apart by handle.
    let twin = store.add_poi(None, shards()).unwrap();
    let (item, location) = store.find_by_identity(deep).unwrap();
    assert_eq!(item.as_poi().unwrap().description, "Shards");
    assert_eq!(location.ancestors, vec![outer, inner]);
    assert_eq!(location.dotted(), "Colonia.Biology");
    assert!(store.find_by_identity(twin).unwrap().1.ancestors.is_empty());

    let census = store.count_folder_contents(outer).unwrap();
    assert_eq!((census.subfolders, census.pois), (1, 2));
    assert!(store.count_folder_contents(deep).is_none());

    let before = store.flatten().len();
    assert!(store.delete(outer).unwrap());
    assert_eq!(store.flatten().len(), before - census.pois);
    assert!(store.find_by_identity(deep).is_none());
}
