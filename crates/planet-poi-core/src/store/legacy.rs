// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Upgrades older POI files in a single pass before they are typed.
//!
//! Old files are flat arrays of POIs with no `type` tag and one combined
//! `body` field (`"HIP 36601 C 3 b"`). Current files tag every item and keep
//! `system` and `body` apart.

use super::record::{FolderRecord, ItemRecord};
use crate::geodesy::split_system_and_body;
use serde_json::{Map, Value};

#[derive(Debug, Default)]
pub(crate) struct Migration {
    pub records: Vec<ItemRecord>,
    /// True when any item was rewritten and the file should be saved.
    pub migrated: bool,
    /// Items that could not be understood and were dropped.
    pub skipped: usize,
}

/// Migrates and types a parsed POI document. Anything but an array is empty.
pub(crate) fn migrate(root: Value) -> Migration {
    let mut migration = Migration::default();
    match root {
        Value::Array(items) => {
            migration.records = parse_items(items, &mut migration);
        }
        Value::Null => {}
        other => {
            log::warn!(
                "POI file root is not an array (found {}); starting empty",
                type_name(&other)
            );
        }
    }
    migration
}

fn parse_items(items: Vec<Value>, migration: &mut Migration) -> Vec<ItemRecord> {
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(mut obj) = item else {
            log::warn!("Skipping non-object entry in POI file");
            migration.skipped += 1;
            continue;
        };

        if upgrade_object(&mut obj) {
            migration.migrated = true;
        }

        if obj.get("type").and_then(Value::as_str) == Some("folder") {
            let children = match obj.remove("children") {
                Some(Value::Array(children)) => children,
                _ => Vec::new(),
            };
            let name = obj
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            records.push(ItemRecord::Folder(FolderRecord {
                name,
                children: parse_items(children, migration),
            }));
            continue;
        }

        match serde_json::from_value::<ItemRecord>(Value::Object(obj)) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("Skipping unreadable POI entry: {}", e);
                migration.skipped += 1;
            }
        }
    }
    records
}

/// Applies the legacy rules to one object. Returns whether it changed.
fn upgrade_object(obj: &mut Map<String, Value>) -> bool {
    let mut changed = false;

    if !obj.contains_key("type") {
        obj.insert("type".to_string(), Value::String("poi".to_string()));
        changed = true;
    }

    let is_poi = obj.get("type").and_then(Value::as_str) == Some("poi");
    if is_poi && obj.contains_key("body") && !obj.contains_key("system") {
        let full = obj
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let (system, body) = split_system_and_body(&full);
        log::info!(
            "Migrated POI: {} -> system={}, body={}",
            full,
            system,
            body
        );
        obj.insert("system".to_string(), Value::String(system));
        obj.insert("body".to_string(), Value::String(body));
        changed = true;
    }

    changed
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
