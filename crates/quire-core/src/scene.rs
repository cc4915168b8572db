//! The item store: items keyed by ID, stacking order, selection, and the
//! child → group index.

use crate::item::{Item, ItemId, ItemKind};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tolerance used when comparing stored group bounds to their children.
const BOUNDS_EPSILON: f64 = 1e-6;

/// On-disk form of a scene: items in insertion order.
#[derive(Serialize, Deserialize)]
struct SceneFile {
    items: Vec<Item>,
}

/// All items on a page plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    items: HashMap<ItemId, Item>,
    /// Insertion order, used to break z ties.
    order: Vec<ItemId>,
    /// Child ID → owning group ID.
    parents: HashMap<ItemId, ItemId>,
    selection: Vec<ItemId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item on top of the stacking order.
    pub fn add_item(&mut self, mut item: Item) -> ItemId {
        item.z = self.top_z() + 1.0;
        self.insert_item(item)
    }

    /// Insert an item keeping its z value. Groups register their children.
    pub fn insert_item(&mut self, item: Item) -> ItemId {
        let id = item.id();
        for child in item.children() {
            self.parents.insert(*child, id);
        }
        if !self.items.contains_key(&id) {
            self.order.push(id);
        }
        self.items.insert(id, item);
        id
    }

    /// Remove an item. Removing a group releases its children; removing a
    /// child detaches it from its group and refits the group (or drops it
    /// once empty).
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let item = self.items.remove(&id)?;
        self.order.retain(|&other| other != id);
        self.selection.retain(|&other| other != id);
        for child in item.children() {
            if self.parents.get(child) == Some(&id) {
                self.parents.remove(child);
            }
        }
        if let Some(group_id) = self.parents.remove(&id) {
            let now_empty = match self.items.get_mut(&group_id).map(|g| &mut g.kind) {
                Some(ItemKind::Group { children, .. }) => {
                    children.retain(|&c| c != id);
                    children.is_empty()
                }
                _ => false,
            };
            if now_empty {
                log::debug!("Group {group_id} lost its last child, removing it");
                self.remove_item(group_id);
            } else {
                self.recompute_group_bounds(group_id);
            }
        }
        Some(item)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items back to front.
    pub fn items_by_z(&self) -> Vec<&Item> {
        let mut items: Vec<(usize, &Item)> = self
            .order
            .iter()
            .enumerate()
            .filter_map(|(idx, id)| self.items.get(id).map(|item| (idx, item)))
            .collect();
        items.sort_by(|(ia, a), (ib, b)| a.z.total_cmp(&b.z).then(ia.cmp(ib)));
        items.into_iter().map(|(_, item)| item).collect()
    }

    /// Highest z value in use, 0 for an empty scene.
    pub fn top_z(&self) -> f64 {
        self.items.values().map(|item| item.z).fold(0.0, f64::max)
    }

    /// Topmost visible non-group item whose shape contains `point`.
    pub fn item_at(&self, point: Point, tolerance: f64) -> Option<ItemId> {
        self.items_by_z()
            .into_iter()
            .rev()
            .find(|item| item.visible && !item.is_group() && item.contains(point, tolerance))
            .map(Item::id)
    }

    /// Selectable leaf items whose page bounds touch `rect`, back to front.
    pub fn items_in_rect(&self, rect: Rect) -> Vec<ItemId> {
        self.items_by_z()
            .into_iter()
            .filter(|item| item.visible && !item.locked && !item.is_group())
            .filter(|item| {
                let b = item.page_bounds();
                b.x0 <= rect.x1 && rect.x0 <= b.x1 && b.y0 <= rect.y1 && rect.y0 <= b.y1
            })
            .map(Item::id)
            .collect()
    }

    /// Union of the page bounds of the given items that exist.
    pub fn union_bounds(&self, ids: &[ItemId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|id| self.items.get(id))
            .map(Item::page_bounds)
            .reduce(|a, b| a.union(b))
    }

    // --- Selection ---

    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection with a single item.
    pub fn select(&mut self, id: ItemId) {
        self.selection.clear();
        self.add_to_selection(id);
    }

    pub fn add_to_selection(&mut self, id: ItemId) {
        if self.items.contains_key(&id) && !self.selection.contains(&id) {
            self.selection.push(id);
        }
    }

    pub fn toggle_selection(&mut self, id: ItemId) {
        if self.selection.contains(&id) {
            self.deselect(id);
        } else {
            self.add_to_selection(id);
        }
    }

    pub fn deselect(&mut self, id: ItemId) {
        self.selection.retain(|&other| other != id);
    }

    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.selection.clear();
        for id in ids {
            self.add_to_selection(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- Groups ---

    pub fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        self.parents.get(&id).copied()
    }

    /// Existing children of a group. Dangling child references are skipped.
    pub fn children_of(&self, group_id: ItemId) -> Vec<ItemId> {
        self.items
            .get(&group_id)
            .map(|group| {
                group
                    .children()
                    .iter()
                    .copied()
                    .filter(|id| self.items.contains_key(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fit a group's position and size to the union of its children.
    /// Returns false when the group has no live children.
    pub fn recompute_group_bounds(&mut self, group_id: ItemId) -> bool {
        let children = self.children_of(group_id);
        let Some(bounds) = self.union_bounds(&children) else {
            return false;
        };
        let Some(group) = self.items.get_mut(&group_id) else {
            return false;
        };
        group.position = bounds.origin();
        group.set_size(bounds.size());
        log::debug!("Recomputed bounds of group {group_id}: {bounds:?}");
        true
    }

    /// Recompute a group's bounds if they no longer match its children.
    pub fn ensure_group_bounds(&mut self, group_id: ItemId) {
        let Some(group) = self.items.get(&group_id) else {
            return;
        };
        let stored = group.page_bounds();
        let children = self.children_of(group_id);
        let Some(actual) = self.union_bounds(&children) else {
            return;
        };
        let stale = (stored.x0 - actual.x0).abs() > BOUNDS_EPSILON
            || (stored.y0 - actual.y0).abs() > BOUNDS_EPSILON
            || (stored.x1 - actual.x1).abs() > BOUNDS_EPSILON
            || (stored.y1 - actual.y1).abs() > BOUNDS_EPSILON;
        if stale {
            log::debug!("Group {group_id} bounds were stale");
            self.recompute_group_bounds(group_id);
        }
    }

    /// Build (without inserting) a group over the given items. Requires at
    /// least two existing, ungrouped, non-group items.
    pub fn build_group(&self, ids: &[ItemId]) -> Option<Item> {
        let members: Vec<ItemId> = self
            .items_by_z()
            .into_iter()
            .filter(|item| ids.contains(&item.id()))
            .filter(|item| !item.is_group() && !self.parents.contains_key(&item.id()))
            .map(Item::id)
            .collect();
        if members.len() < 2 {
            return None;
        }
        let bounds = self.union_bounds(&members)?;
        let mut group = Item::group(members, bounds);
        group.z = self.top_z() + 1.0;
        Some(group)
    }

    /// Group the given items. Returns the new group's ID.
    pub fn group(&mut self, ids: &[ItemId]) -> Option<ItemId> {
        let group = self.build_group(ids)?;
        Some(self.insert_item(group))
    }

    /// Remove a group item, releasing its children. Returns the child IDs.
    pub fn ungroup(&mut self, group_id: ItemId) -> Option<Vec<ItemId>> {
        if !self.items.get(&group_id)?.is_group() {
            return None;
        }
        let children = self.children_of(group_id);
        self.remove_item(group_id);
        Some(children)
    }

    /// Add an existing item to a group's children and refit the group.
    pub fn attach_child(&mut self, group_id: ItemId, child_id: ItemId) {
        if !self.items.contains_key(&child_id) {
            return;
        }
        match self.items.get_mut(&group_id).map(|g| &mut g.kind) {
            Some(ItemKind::Group { children, .. }) => {
                if !children.contains(&child_id) {
                    children.push(child_id);
                }
            }
            _ => {
                log::warn!("Cannot attach {child_id}: {group_id} is not a group");
                return;
            }
        }
        self.parents.insert(child_id, group_id);
        self.recompute_group_bounds(group_id);
    }

    fn rebuild_parents(&mut self) {
        self.parents.clear();
        for item in self.items.values() {
            for child in item.children() {
                self.parents.insert(*child, item.id());
            }
        }
    }

    // --- Serialization ---

    /// Serialize the scene to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let file = SceneFile {
            items: self
                .order
                .iter()
                .filter_map(|id| self.items.get(id).cloned())
                .collect(),
        };
        serde_json::to_string_pretty(&file)
    }

    /// Deserialize a scene from JSON. Group bounds are refit on load.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: SceneFile = serde_json::from_str(json)?;
        let mut scene = Self::new();
        for item in file.items {
            let id = item.id();
            scene.order.push(id);
            scene.items.insert(id, item);
        }
        scene.rebuild_parents();
        let groups: Vec<ItemId> = scene
            .items
            .values()
            .filter(|item| item.is_group())
            .map(Item::id)
            .collect();
        for group_id in groups {
            scene.ensure_group_bounds(group_id);
        }
        Ok(scene)
    }
}
