// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

mod legacy;
mod poi;
mod record;
mod tree;

pub use poi::{parse_coordinate, Coordinates, Folder, Item, Poi, PoiEdit};
pub(crate) use record::coordinate;
pub use record::{FolderRecord, ItemRecord, PoiRecord};
pub use tree::{FolderCensus, Location, NodeId, PoiTree};

use crate::PoiError;
use anyhow::Context;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard the current tree.
    Replace,
    /// Append imported items to the root.
    Merge,
}

/// The POI tree mirrored to a JSON file.
///
/// Every command writes the whole tree back before returning. When the
/// write fails the in-memory change is kept and the error is returned so
/// the caller can warn or retry.
#[derive(Debug, Clone)]
pub struct PoiStore {
    path: PathBuf,
    tree: PoiTree,
}

impl PoiStore {
    /// Loads the tree at `path`. Missing or unreadable files give an empty tree.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let tree = match read_document(&path) {
            Ok(Some(doc)) => {
                let migration = legacy::migrate(doc);
                let tree = PoiTree::from_records(migration.records);
                if migration.skipped > 0 {
                    log::warn!(
                        "Dropped {} unreadable entries from {}",
                        migration.skipped,
                        path.display()
                    );
                }
                if migration.migrated {
                    log::info!("Saving migrated POI format to {}", path.display());
                    if let Err(e) = write_tree(&path, &tree) {
                        log::error!("Failed to save migrated POIs: {}", e);
                    }
                }
                tree
            }
            Ok(None) => PoiTree::new(),
            Err(e) => {
                log::error!("Error loading POIs from {}: {:#}", path.display(), e);
                PoiTree::new()
            }
        };

        log::debug!(
            "Loaded POI tree — path={} items={}",
            path.display(),
            tree.len()
        );
        Self { path, tree }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tree(&self) -> &PoiTree {
        &self.tree
    }

    /// Writes the whole tree to the backing file.
    pub fn save(&self) -> Result<(), PoiError> {
        write_tree(&self.path, &self.tree)
    }

    fn commit(&self) -> Result<(), PoiError> {
        self.save().map_err(|e| {
            log::error!("Error saving POIs to {}: {}", self.path.display(), e);
            e
        })
    }

    pub fn flatten(&self) -> Vec<(NodeId, &Poi)> {
        self.tree.pois().collect()
    }

    pub fn find_by_identity(&self, id: NodeId) -> Option<(&Item, Location)> {
        let location = self.tree.find(id)?;
        self.tree.get(id).map(|item| (item, location))
    }

    /// `"A > B"` for the folder holding `id`, `"(Root level)"` at the top.
    pub fn location_path(&self, id: NodeId) -> Option<String> {
        self.tree.find(id).map(|loc| loc.display())
    }

    pub fn count_folder_contents(&self, folder: NodeId) -> Option<FolderCensus> {
        self.tree.census(folder)
    }

    /// POIs whose full body name is `body`, in store order.
    pub fn pois_on_body<'a>(&'a self, body: &'a str) -> impl Iterator<Item = (NodeId, &'a Poi)> + 'a {
        self.tree
            .pois()
            .filter(move |(_, p)| p.full_body_name() == body)
    }

    pub fn active_pois_on_body<'a>(
        &'a self,
        body: &'a str,
    ) -> impl Iterator<Item = (NodeId, &'a Poi)> + 'a {
        self.pois_on_body(body).filter(|(_, p)| p.active)
    }

    pub fn pois_in_system<'a>(&'a self, system: &'a str) -> impl Iterator<Item = (NodeId, &'a Poi)> + 'a {
        self.tree.pois().filter(move |(_, p)| p.system == system)
    }

    pub fn create_folder(&mut self, parent: Option<NodeId>, name: &str) -> Result<NodeId, PoiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PoiError::EmptyField("Folder name"));
        }
        let id = self.tree.append(parent, Item::Folder(Folder::new(name)))?;
        self.commit()?;
        Ok(id)
    }

    pub fn add_poi(&mut self, parent: Option<NodeId>, poi: Poi) -> Result<NodeId, PoiError> {
        let id = self.tree.append(parent, Item::Poi(poi))?;
        self.commit()?;
        Ok(id)
    }

    /// Removes an item (and a folder's subtree). Saves only if something went.
    pub fn delete(&mut self, id: NodeId) -> Result<bool, PoiError> {
        if !self.tree.remove(id) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    /// Moves an item to the end of `destination` (root for `None`).
    pub fn move_item(&mut self, id: NodeId, destination: Option<NodeId>) -> Result<bool, PoiError> {
        if !self.tree.move_to(id, destination)? {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    /// Flips a POI's active flag and returns the new value.
    pub fn toggle_active(&mut self, id: NodeId) -> Result<bool, PoiError> {
        let poi = self.poi_mut(id)?;
        poi.active = !poi.active;
        let active = poi.active;
        self.commit()?;
        Ok(active)
    }

    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), PoiError> {
        let poi = self.poi_mut(id)?;
        if poi.active == active {
            return Ok(());
        }
        poi.active = active;
        self.commit()
    }

    pub fn edit_poi(&mut self, id: NodeId, edit: PoiEdit) -> Result<(), PoiError> {
        edit.apply(self.poi_mut(id)?);
        self.commit()
    }

    pub fn rename_folder(&mut self, id: NodeId, name: &str) -> Result<(), PoiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PoiError::EmptyField("Folder name"));
        }
        match self.tree.get_mut(id) {
            Some(Item::Folder(folder)) => folder.name = name.to_string(),
            Some(Item::Poi(_)) => return Err(PoiError::NotAFolder(id)),
            None => return Err(PoiError::UnknownNode(id)),
        }
        self.commit()
    }

    fn poi_mut(&mut self, id: NodeId) -> Result<&mut Poi, PoiError> {
        match self.tree.get_mut(id) {
            Some(Item::Poi(poi)) => Ok(poi),
            // A folder is not a POI; report it the same way as a missing one.
            _ => Err(PoiError::UnknownNode(id)),
        }
    }

    /// Writes a copy of the tree to another file.
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<(), PoiError> {
        write_tree(path.as_ref(), &self.tree)?;
        log::info!("POIs exported to {}", path.as_ref().display());
        Ok(())
    }

    /// Reads another POI file (old formats included) into this store.
    /// Returns the number of top-level items imported.
    pub fn import_from<P: AsRef<Path>>(&mut self, path: P, mode: ImportMode) -> Result<usize, PoiError> {
        let content = fs::read_to_string(path.as_ref())?;
        let doc: Value = serde_json::from_str(&content)?;
        let migration = legacy::migrate(doc);

        if mode == ImportMode::Replace {
            self.tree.clear();
        }
        let count = self.tree.attach_records(None, migration.records);
        log::info!(
            "POIs imported from {} — mode={:?} items={}",
            path.as_ref().display(),
            mode,
            count
        );
        self.commit()?;
        Ok(count)
    }
}

fn read_document(path: &Path) -> anyhow::Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).context("Failed to read POI file")?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let doc = serde_json::from_str(&content).context("Failed to parse POI file")?;
    Ok(Some(doc))
}

/// Serializes the tree next to `path` and renames it into place.
fn write_tree(path: &Path, tree: &PoiTree) -> Result<(), PoiError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    let content = serde_json::to_string_pretty(&tree.to_records())?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| PoiError::Io(e.error))?;

    log::debug!("Saved POIs to {}", path.display());
    Ok(())
}
