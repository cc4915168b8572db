//! Reversible mutation records.

use crate::item::{Item, ItemId};
use crate::scene::Scene;
use kurbo::{Point, Size, Vec2};

/// Snapshot of a point-list item's geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsState {
    pub position: Point,
    pub size: Size,
    pub points: Vec<Point>,
}

impl PointsState {
    /// Capture the geometry of a polygon or freehand item.
    pub fn capture(item: &Item) -> Option<Self> {
        Some(Self {
            position: item.position,
            size: item.size(),
            points: item.points()?.to_vec(),
        })
    }

    fn apply(&self, item: &mut Item) {
        item.position = self.position;
        item.set_size(self.size);
        item.set_points(self.points.clone());
    }
}

/// Snapshot of a line or arrow's geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentState {
    pub position: Point,
    pub end: Vec2,
}

impl SegmentState {
    pub fn capture(item: &Item) -> Option<Self> {
        Some(Self {
            position: item.position,
            end: item.segment_end()?,
        })
    }

    fn apply(&self, item: &mut Item) {
        item.position = self.position;
        item.set_segment_end(self.end);
    }
}

/// A reversible mutation of one item, or a macro of several.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Move {
        id: ItemId,
        old: Point,
        new: Point,
    },
    Resize {
        id: ItemId,
        old_position: Point,
        new_position: Point,
        old_size: Size,
        new_size: Size,
    },
    ResizePoints {
        id: ItemId,
        old: PointsState,
        new: PointsState,
    },
    EditVertex {
        id: ItemId,
        old: PointsState,
        new: PointsState,
    },
    Rotate {
        id: ItemId,
        old: f64,
        new: f64,
    },
    /// Line/arrow geometry change (endpoint drag or group scaling).
    Endpoints {
        id: ItemId,
        old: SegmentState,
        new: SegmentState,
    },
    /// Creation of a group. Holds the group item as created.
    Group { group: Item },
    /// Dissolution of a group. Holds the group item as it was.
    Ungroup { group: Item },
    /// Deletion of an item, remembering the group it belonged to.
    Remove { item: Item, parent: Option<ItemId> },
    /// Commands that undo and redo as one step.
    Macro {
        label: String,
        commands: Vec<Command>,
    },
}

impl Command {
    /// User-visible name, shown in Undo/Redo menu entries.
    pub fn label(&self) -> &str {
        match self {
            Command::Move { .. } => "Move Item",
            Command::Resize { .. } => "Resize Item",
            Command::ResizePoints { .. } => "Resize Points",
            Command::EditVertex { .. } => "Edit Vertex",
            Command::Rotate { .. } => "Rotate Item",
            Command::Endpoints { .. } => "Move Endpoint",
            Command::Group { .. } => "Group Items",
            Command::Ungroup { .. } => "Ungroup",
            Command::Remove { .. } => "Delete Item",
            Command::Macro { label, .. } => label,
        }
    }

    /// Restore the "after" state.
    pub fn redo(&self, scene: &mut Scene) {
        match self {
            Command::Move { id, new, .. } => {
                with_item(scene, *id, self.label(), |item| item.position = *new);
            }
            Command::Resize {
                id,
                new_position,
                new_size,
                ..
            } => with_item(scene, *id, self.label(), |item| {
                item.position = *new_position;
                item.set_size(*new_size);
            }),
            Command::ResizePoints { id, new, .. } | Command::EditVertex { id, new, .. } => {
                with_item(scene, *id, self.label(), |item| new.apply(item));
            }
            Command::Rotate { id, new, .. } => {
                with_item(scene, *id, self.label(), |item| item.rotation = *new);
            }
            Command::Endpoints { id, new, .. } => {
                with_item(scene, *id, self.label(), |item| new.apply(item));
            }
            Command::Group { group } => insert_group(scene, group),
            Command::Ungroup { group } => {
                scene.ungroup(group.id());
            }
            Command::Remove { item, .. } => {
                if scene.remove_item(item.id()).is_none() {
                    log::warn!("Delete Item: item {} already gone", item.id());
                }
            }
            Command::Macro { commands, .. } => {
                for command in commands {
                    command.redo(scene);
                }
            }
        }
    }

    /// Restore the "before" state.
    pub fn undo(&self, scene: &mut Scene) {
        match self {
            Command::Move { id, old, .. } => {
                with_item(scene, *id, self.label(), |item| item.position = *old);
            }
            Command::Resize {
                id,
                old_position,
                old_size,
                ..
            } => with_item(scene, *id, self.label(), |item| {
                item.position = *old_position;
                item.set_size(*old_size);
            }),
            Command::ResizePoints { id, old, .. } | Command::EditVertex { id, old, .. } => {
                with_item(scene, *id, self.label(), |item| old.apply(item));
            }
            Command::Rotate { id, old, .. } => {
                with_item(scene, *id, self.label(), |item| item.rotation = *old);
            }
            Command::Endpoints { id, old, .. } => {
                with_item(scene, *id, self.label(), |item| old.apply(item));
            }
            Command::Group { group } => {
                scene.ungroup(group.id());
            }
            Command::Ungroup { group } => insert_group(scene, group),
            Command::Remove { item, parent } => {
                let id = scene.insert_item(item.clone());
                if let Some(group_id) = parent {
                    scene.attach_child(*group_id, id);
                }
            }
            Command::Macro { commands, .. } => {
                for command in commands.iter().rev() {
                    command.undo(scene);
                }
            }
        }
    }

    /// Collect the IDs of every item this command touches.
    pub fn touched_items(&self, out: &mut Vec<ItemId>) {
        match self {
            Command::Move { id, .. }
            | Command::Resize { id, .. }
            | Command::ResizePoints { id, .. }
            | Command::EditVertex { id, .. }
            | Command::Rotate { id, .. }
            | Command::Endpoints { id, .. } => out.push(*id),
            Command::Group { group } | Command::Ungroup { group } => {
                out.push(group.id());
                out.extend_from_slice(group.children());
            }
            Command::Remove { item, parent } => {
                out.push(item.id());
                out.extend(parent);
            }
            Command::Macro { commands, .. } => {
                for command in commands {
                    command.touched_items(out);
                }
            }
        }
    }

    /// Number of leaf commands (macros count their members).
    pub fn leaf_count(&self) -> usize {
        match self {
            Command::Macro { commands, .. } => commands.iter().map(Command::leaf_count).sum(),
            _ => 1,
        }
    }
}

fn with_item(scene: &mut Scene, id: ItemId, label: &str, f: impl FnOnce(&mut Item)) {
    match scene.get_mut(id) {
        Some(item) => f(item),
        None => log::warn!("{label}: item {id} no longer exists, skipping"),
    }
}

fn insert_group(scene: &mut Scene, group: &Item) {
    let missing = group.children().iter().filter(|id| !scene.contains(**id)).count();
    if missing > 0 {
        log::warn!("Restoring group {} with {missing} missing children", group.id());
    }
    let id = scene.insert_item(group.clone());
    scene.ensure_group_bounds(id);
}
