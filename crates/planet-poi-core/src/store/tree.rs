// SPDX-License-Identifier: MIT
// Copyright (c) 2026 PlanetPOI contributors

//! Arena-backed folder tree. Nodes are addressed by [`NodeId`]; identity is
//! handle equality, so two POIs with identical fields stay distinct.

use super::poi::{Folder, Item, Poi};
use super::record::{FolderRecord, ItemRecord};
use crate::PoiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(NodeId)
    }
}

#[derive(Debug, Clone)]
struct Node {
    item: Item,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Where an item sits: folder names from the root down, and the folder ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: Vec<String>,
    pub ancestors: Vec<NodeId>,
}

impl Location {
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// `"A > B"`, or `"(Root level)"` for top-level items.
    pub fn display(&self) -> String {
        if self.path.is_empty() {
            "(Root level)".to_string()
        } else {
            self.path.join(" > ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FolderCensus {
    pub subfolders: usize,
    pub pois: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PoiTree {
    nodes: Vec<Option<Node>>,
    root: Vec<NodeId>,
}

impl PoiTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree, assigning ids in pre-order.
    pub fn from_records(records: Vec<ItemRecord>) -> Self {
        let mut tree = Self::new();
        tree.attach_records(None, records);
        tree
    }

    pub(crate) fn attach_records(&mut self, parent: Option<NodeId>, records: Vec<ItemRecord>) -> usize {
        let mut attached = 0;
        for record in records {
            match record {
                ItemRecord::Poi(p) => {
                    self.push_node(parent, Item::Poi(Poi::from_record(p)));
                }
                ItemRecord::Folder(FolderRecord { name, children }) => {
                    let id = self.push_node(parent, Item::Folder(Folder::new(name)));
                    self.attach_records(Some(id), children);
                }
            }
            attached += 1;
        }
        attached
    }

    pub fn to_records(&self) -> Vec<ItemRecord> {
        self.records_for(&self.root)
    }

    fn records_for(&self, ids: &[NodeId]) -> Vec<ItemRecord> {
        ids.iter()
            .filter_map(|&id| self.node(id))
            .map(|node| match &node.item {
                Item::Poi(p) => ItemRecord::Poi(p.to_record()),
                Item::Folder(f) => {
                    let mut rec = f.to_record();
                    rec.children = self.records_for(&node.children);
                    ItemRecord::Folder(rec)
                }
            })
            .collect()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn push_node(&mut self, parent: Option<NodeId>, item: Item) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            item,
            parent,
            children: Vec::new(),
        }));
        self.siblings_mut(parent).push(id);
        id
    }

    /// The list `parent` keeps its children in. `parent` must be a live folder.
    fn siblings_mut(&mut self, parent: Option<NodeId>) -> &mut Vec<NodeId> {
        match parent {
            None => &mut self.root,
            Some(pid) => match self.nodes.get_mut(pid.0).and_then(Option::as_mut) {
                Some(node) => &mut node.children,
                None => &mut self.root,
            },
        }
    }

    fn check_folder(&self, id: NodeId) -> Result<(), PoiError> {
        match self.node(id) {
            None => Err(PoiError::UnknownNode(id)),
            Some(node) if node.item.is_folder() => Ok(()),
            Some(_) => Err(PoiError::NotAFolder(id)),
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of live items, folders included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn get(&self, id: NodeId) -> Option<&Item> {
        self.node(id).map(|n| &n.item)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Item> {
        self.node_mut(id).map(|n| &mut n.item)
    }

    pub fn poi(&self, id: NodeId) -> Option<&Poi> {
        self.get(id).and_then(Item::as_poi)
    }

    pub fn root_children(&self) -> &[NodeId] {
        &self.root
    }

    /// Children of a folder, or of the root for `None`.
    pub fn children(&self, parent: Option<NodeId>) -> Result<&[NodeId], PoiError> {
        match parent {
            None => Ok(&self.root),
            Some(pid) => {
                self.check_folder(pid)?;
                Ok(self.node(pid).map(|n| n.children.as_slice()).unwrap_or_default())
            }
        }
    }

    /// Direct parent folder; `None` for top-level or unknown items.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Appends an item to a folder (or the root) and returns its handle.
    pub fn append(&mut self, parent: Option<NodeId>, item: Item) -> Result<NodeId, PoiError> {
        if let Some(pid) = parent {
            self.check_folder(pid)?;
        }
        Ok(self.push_node(parent, item))
    }

    /// Removes an item; a folder goes with its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.detach(id) {
            return false;
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                pending.extend(node.children);
            }
        }
        true
    }

    /// Removes every item. Freed ids stay retired, so handles taken
    /// before the clear never resolve to items added after it.
    pub fn clear(&mut self) {
        self.root.clear();
        for slot in &mut self.nodes {
            *slot = None;
        }
    }

    /// Unlinks `id` from its parent's child list without freeing it.
    fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).map(|n| n.parent) else {
            return false;
        };
        let siblings = self.siblings_mut(parent);
        match siblings.iter().position(|&c| c == id) {
            Some(pos) => {
                siblings.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Moves `id` to the end of `destination`'s children.
    ///
    /// Returns `Ok(false)` when `id` is not in the tree. Rejects, without
    /// mutating, a destination that is `id` itself or lies inside it.
    pub fn move_to(&mut self, id: NodeId, destination: Option<NodeId>) -> Result<bool, PoiError> {
        if !self.contains(id) {
            return Ok(false);
        }
        if let Some(dest) = destination {
            self.check_folder(dest)?;
            let mut cursor = Some(dest);
            while let Some(current) = cursor {
                if current == id {
                    return Err(PoiError::WouldCreateCycle {
                        moved: id,
                        destination: dest,
                    });
                }
                cursor = self.parent(current);
            }
        }

        if !self.detach(id) {
            return Ok(false);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = destination;
        }
        self.siblings_mut(destination).push(id);
        Ok(true)
    }

    /// POI handles in depth-first pre-order.
    pub fn flatten(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_pois(&self.root, &mut out);
        out
    }

    fn collect_pois(&self, ids: &[NodeId], out: &mut Vec<NodeId>) {
        for &id in ids {
            if let Some(node) = self.node(id) {
                match node.item {
                    Item::Poi(_) => out.push(id),
                    Item::Folder(_) => self.collect_pois(&node.children, out),
                }
            }
        }
    }

    /// POIs with their handles, in store order.
    pub fn pois(&self) -> impl Iterator<Item = (NodeId, &Poi)> + '_ {
        self.flatten()
            .into_iter()
            .filter_map(move |id| self.poi(id).map(|p| (id, p)))
    }

    pub fn find(&self, id: NodeId) -> Option<Location> {
        self.node(id)?;
        let mut ancestors = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(pid) = cursor {
            ancestors.push(pid);
            cursor = self.parent(pid);
        }
        ancestors.reverse();
        let path = ancestors
            .iter()
            .filter_map(|&a| self.get(a).and_then(Item::as_folder))
            .map(|f| f.name.clone())
            .collect();
        Some(Location { path, ancestors })
    }

    /// Recursive count of a folder's descendants.
    pub fn census(&self, folder: NodeId) -> Option<FolderCensus> {
        let node = self.node(folder)?;
        node.item.as_folder()?;
        let mut census = FolderCensus::default();
        let mut pending: Vec<NodeId> = node.children.clone();
        while let Some(next) = pending.pop() {
            if let Some(child) = self.node(next) {
                match child.item {
                    Item::Poi(_) => census.pois += 1,
                    Item::Folder(_) => {
                        census.subfolders += 1;
                        pending.extend(child.children.iter().copied());
                    }
                }
            }
        }
        Some(census)
    }

    /// Every folder handle in pre-order, for move-destination pickers.
    pub fn folders(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.root.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                if node.item.is_folder() {
                    out.push(id);
                    stack.extend(node.children.iter().rev().copied());
                }
            }
        }
        out
    }
}
