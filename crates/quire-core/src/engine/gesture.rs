//! Move, resize, rotate, endpoint and rubber-band gestures.

use super::TransformEngine;
use super::vertex::VertexDrag;
use crate::handles::{HandleKind, ResizeEdges};
use crate::history::{Command, PointsState, SegmentState};
use crate::input::Modifiers;
use crate::item::{Item, ItemId};
use crate::snap::{snap_line_endpoint, snap_rotation_delta};
use crate::transform::{
    frame_linear, resize_box, rotate_about, rotation_delta, scale_child_position,
    scale_child_size, scale_factors, scale_points, segment_from_page,
};
use kurbo::{Point, Rect, Size, Vec2};

/// The gesture in progress, with the snapshots needed to cancel it.
#[derive(Debug, Default)]
pub(crate) enum Gesture {
    #[default]
    Idle,
    Move(MoveGesture),
    Resize(ResizeGesture),
    Rotate(RotateGesture),
    Endpoint(EndpointGesture),
    RubberBand(RubberBand),
    Vertex(VertexDrag),
}

impl Gesture {
    pub(crate) fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Move(_) => "move",
            Gesture::Resize(_) => "resize",
            Gesture::Rotate(_) => "rotate",
            Gesture::Endpoint(_) => "endpoint",
            Gesture::RubberBand(_) => "rubber-band",
            Gesture::Vertex(_) => "vertex",
        }
    }

    /// Items as they were when the gesture started.
    pub(crate) fn snapshots(&self) -> Vec<&Item> {
        match self {
            Gesture::Idle | Gesture::RubberBand(_) => Vec::new(),
            Gesture::Move(g) => g.originals.iter().collect(),
            Gesture::Resize(g) => std::iter::once(&g.original).chain(&g.children).collect(),
            Gesture::Rotate(g) => std::iter::once(&g.original).chain(&g.children).collect(),
            Gesture::Endpoint(g) => vec![&g.original],
            Gesture::Vertex(g) => vec![&g.original],
        }
    }
}

#[derive(Debug)]
pub(crate) struct MoveGesture {
    start: Point,
    /// Every moving item: the selection plus children of selected groups.
    originals: Vec<Item>,
    /// Union of the moving items' page bounds at drag start.
    start_bounds: Option<Rect>,
}

#[derive(Debug)]
pub(crate) struct ResizeGesture {
    start: Point,
    edges: ResizeEdges,
    original: Item,
    children: Vec<Item>,
}

#[derive(Debug)]
pub(crate) struct RotateGesture {
    start: Point,
    center: Point,
    original: Item,
    children: Vec<Item>,
}

#[derive(Debug)]
pub(crate) struct EndpointGesture {
    start: Point,
    index: usize,
    original: Item,
    /// Page position of the dragged endpoint at drag start.
    moving: Point,
    /// Page position of the endpoint that stays put.
    fixed: Point,
}

#[derive(Debug)]
pub(crate) struct RubberBand {
    pub(crate) origin: Point,
    pub(crate) current: Point,
    pub(crate) additive: bool,
}

impl RubberBand {
    pub(crate) fn rect(&self) -> Rect {
        Rect::from_points(self.origin, self.current)
    }
}

/// Which local point of a resized box stays fixed in page space.
fn pinned_anchor(edges: ResizeEdges, size: Size) -> Point {
    let x = if edges.left {
        size.width
    } else if edges.right {
        0.0
    } else {
        size.width / 2.0
    };
    let y = if edges.top {
        size.height
    } else if edges.bottom {
        0.0
    } else {
        size.height / 2.0
    };
    Point::new(x, y)
}

impl TransformEngine {
    // --- Move ---

    pub(super) fn begin_move(&mut self, pos: Point) {
        let mut moving: Vec<ItemId> = Vec::new();
        for id in self.scene.selection().to_vec() {
            let Some(item) = self.scene.get(id) else {
                continue;
            };
            if item.locked {
                continue;
            }
            if item.is_group() {
                self.scene.ensure_group_bounds(id);
            }
            if !moving.contains(&id) {
                moving.push(id);
            }
            for child in self.scene.children_of(id) {
                if !moving.contains(&child) {
                    moving.push(child);
                }
            }
        }
        if moving.is_empty() {
            return;
        }

        let originals: Vec<Item> = moving
            .iter()
            .filter_map(|id| self.scene.get(*id).cloned())
            .collect();
        let start_bounds = self.scene.union_bounds(&moving);

        let candidates: Vec<(ItemId, Rect)> = self
            .scene
            .items_by_z()
            .into_iter()
            .filter(|item| item.visible && !moving.contains(&item.id()))
            .map(|item| (item.id(), item.page_bounds()))
            .collect();
        let families = self.settings.snap.guides;
        let snap_distance = self.snap_distance();
        self.guides.begin(candidates, families, snap_distance);

        log::debug!("Begin move of {} items", originals.len());
        self.gesture = Gesture::Move(MoveGesture {
            start: pos,
            originals,
            start_bounds,
        });
    }

    pub(super) fn update_move(&mut self, g: &MoveGesture, pos: Point) {
        let mut delta = pos - g.start;
        let snap_distance = self.snap_distance();
        if snap_distance > 0.0 {
            if let Some(bounds) = g.start_bounds {
                let correction = self.guides.compute_snap(bounds + delta, snap_distance);
                delta += correction.offset();
            }
        }
        for original in &g.originals {
            if let Some(item) = self.scene.get_mut(original.id()) {
                item.position = original.position + delta;
            }
        }
    }

    pub(super) fn commit_move(&mut self, g: MoveGesture) {
        self.guides.end();
        let commands: Vec<Command> = g
            .originals
            .iter()
            .filter_map(|original| {
                let current = self.scene.get(original.id())?;
                (current.position != original.position).then(|| Command::Move {
                    id: original.id(),
                    old: original.position,
                    new: current.position,
                })
            })
            .collect();
        self.record("Move Items", commands, false);
        let ids: Vec<ItemId> = g.originals.iter().map(Item::id).collect();
        self.refit_groups(&ids);
    }

    // --- Handle drags ---

    pub(super) fn begin_handle_drag(&mut self, target: ItemId, kind: HandleKind, pos: Point) {
        if self.scene.get(target).is_some_and(Item::is_group) {
            self.scene.ensure_group_bounds(target);
        }
        let Some(original) = self.scene.get(target).cloned() else {
            return;
        };
        let children: Vec<Item> = self
            .scene
            .children_of(target)
            .into_iter()
            .filter_map(|id| self.scene.get(id).cloned())
            .collect();

        log::debug!("Begin {kind:?} drag on {} {}", original.kind_name(), target);
        self.gesture = match kind {
            HandleKind::Rotate => Gesture::Rotate(RotateGesture {
                start: pos,
                center: original.page_center(),
                original,
                children,
            }),
            HandleKind::Endpoint(index) => {
                let Some((a, b)) = original.segment_page_points() else {
                    return;
                };
                let (moving, fixed) = if index == 0 { (a, b) } else { (b, a) };
                Gesture::Endpoint(EndpointGesture {
                    start: pos,
                    index,
                    original,
                    moving,
                    fixed,
                })
            }
            HandleKind::Corner(_) | HandleKind::Edge(_) => {
                let Some(edges) = kind.resize_edges() else {
                    return;
                };
                Gesture::Resize(ResizeGesture {
                    start: pos,
                    edges,
                    original,
                    children,
                })
            }
            HandleKind::Vertex(_) => return,
        };
    }

    // --- Resize ---

    pub(super) fn update_resize(&mut self, g: &ResizeGesture, pos: Point) {
        let original = &g.original;
        if original.is_segment() {
            return;
        }
        let page_delta = pos - g.start;
        let local_delta = if original.is_group() {
            page_delta
        } else {
            let linear = frame_linear(original.rotation, original.flip_h, original.flip_v);
            (linear.inverse() * page_delta.to_point()).to_vec2()
        };

        let start_box = Rect::from_origin_size(original.position, original.size());
        let new_box = resize_box(
            start_box,
            g.edges,
            local_delta,
            self.settings.min_item_size,
        );
        let scale = scale_factors(original.size(), new_box.size());

        let mut resized = original.clone();
        resized.position = new_box.origin();
        resized.set_size(new_box.size());
        if let Some(points) = original.points() {
            resized.set_points(scale_points(points, scale));
        }

        // Keep the side opposite the handle fixed on the page when the
        // item is rotated or flipped.
        let oriented = original.rotation != 0.0 || original.flip_h || original.flip_v;
        if !original.is_group() && oriented {
            let before = original.map_to_page(pinned_anchor(g.edges, original.size()));
            let after = resized.map_to_page(pinned_anchor(g.edges, new_box.size()));
            resized.position += before - after;
        }

        let group_start = original.position;
        let group_new = resized.position;
        if let Some(item) = self.scene.get_mut(original.id()) {
            *item = resized;
        }

        for child in &g.children {
            let Some(item) = self.scene.get_mut(child.id()) else {
                continue;
            };
            item.position = scale_child_position(child.position, group_start, group_new, scale);
            if child.is_rect_like() {
                item.set_size(scale_child_size(child.size(), scale));
            } else if let Some(points) = child.points() {
                item.set_points(scale_points(points, scale));
                let size = child.size();
                item.set_size(Size::new(size.width * scale.x, size.height * scale.y));
            } else if let Some(end) = child.segment_end() {
                item.set_segment_end(Vec2::new(end.x * scale.x, end.y * scale.y));
            }
        }
    }

    pub(super) fn commit_resize(&mut self, g: ResizeGesture) {
        let Some(current) = self.scene.get(g.original.id()).cloned() else {
            return;
        };
        let mut commands = Vec::new();
        if let Some(command) = resize_command(&g.original, &current) {
            commands.push(command);
        }
        for child in &g.children {
            let Some(now) = self.scene.get(child.id()) else {
                continue;
            };
            if let Some(command) = resize_command(child, now) {
                commands.push(command);
            }
        }
        let is_group = g.original.is_group() && !g.children.is_empty();
        if is_group {
            self.record("Resize Group", commands, true);
            self.scene.recompute_group_bounds(g.original.id());
        } else {
            self.record("Resize Item", commands, false);
            self.refit_groups(&[g.original.id()]);
        }
    }

    // --- Rotate ---

    pub(super) fn update_rotate(&mut self, g: &RotateGesture, pos: Point, mods: Modifiers) {
        let Some(mut delta) = rotation_delta(g.center, g.start, pos) else {
            return;
        };
        if mods.shift {
            delta = snap_rotation_delta(delta, self.settings.rotate_snap_degrees);
        }
        if let Some(item) = self.scene.get_mut(g.original.id()) {
            item.rotation = g.original.rotation + delta;
        }
        for child in &g.children {
            let Some(item) = self.scene.get_mut(child.id()) else {
                continue;
            };
            let center = child.page_center();
            let orbited = rotate_about(center, g.center, delta);
            item.position = child.position + (orbited - center);
            item.rotation = child.rotation + delta;
        }
    }

    pub(super) fn commit_rotate(&mut self, g: RotateGesture) {
        let id = g.original.id();
        let Some(current) = self.scene.get(id).map(|item| item.rotation) else {
            return;
        };
        if current == g.original.rotation {
            return;
        }
        let mut commands = vec![Command::Rotate {
            id,
            old: g.original.rotation,
            new: current,
        }];
        for child in &g.children {
            let Some(now) = self.scene.get(child.id()) else {
                continue;
            };
            if now.position != child.position {
                commands.push(Command::Move {
                    id: child.id(),
                    old: child.position,
                    new: now.position,
                });
            }
            if now.rotation != child.rotation {
                commands.push(Command::Rotate {
                    id: child.id(),
                    old: child.rotation,
                    new: now.rotation,
                });
            }
        }
        if g.original.is_group() && !g.children.is_empty() {
            self.record("Rotate Group", commands, true);
            self.scene.recompute_group_bounds(id);
        } else {
            self.record("Rotate Item", commands, false);
            self.refit_groups(&[id]);
        }
    }

    // --- Line endpoints ---

    pub(super) fn update_endpoint(&mut self, g: &EndpointGesture, pos: Point, mods: Modifiers) {
        let mut moving = g.moving + (pos - g.start);
        if mods.shift {
            moving = snap_line_endpoint(g.fixed, moving, self.settings.rotate_snap_degrees).point;
        }
        let (page_start, page_end) = if g.index == 0 {
            (moving, g.fixed)
        } else {
            (g.fixed, moving)
        };
        let original = &g.original;
        let (position, end) = segment_from_page(
            original.rotation,
            original.flip_h,
            original.flip_v,
            page_start,
            page_end,
        );
        if let Some(item) = self.scene.get_mut(original.id()) {
            item.position = position;
            item.set_segment_end(end);
        }
    }

    pub(super) fn commit_endpoint(&mut self, g: EndpointGesture) {
        let id = g.original.id();
        let old = SegmentState::capture(&g.original);
        let new = self.scene.get(id).and_then(SegmentState::capture);
        if let (Some(old), Some(new)) = (old, new) {
            if old != new {
                self.record("Move Endpoint", vec![Command::Endpoints { id, old, new }], false);
                self.refit_groups(&[id]);
            }
        }
    }

    // --- Rubber band ---

    pub(super) fn finish_rubber_band(&mut self, band: RubberBand) {
        let rect = band.rect();
        if rect.width() <= 2.0 || rect.height() <= 2.0 {
            return;
        }
        if !band.additive {
            self.scene.clear_selection();
        }
        for id in self.scene.items_in_rect(rect) {
            self.scene.add_to_selection(id);
        }
        // Selected children are replaced by their group.
        let consolidated: Vec<ItemId> = self
            .scene
            .selection()
            .iter()
            .map(|&id| self.scene.parent_of(id).unwrap_or(id))
            .collect();
        self.scene.set_selection(consolidated);
        log::debug!("Rubber band selected {} items", self.scene.selection().len());
    }
}

/// Command describing how `now` differs from `before`, if at all.
fn resize_command(before: &Item, now: &Item) -> Option<Command> {
    let id = before.id();
    if before.has_points() {
        let old = PointsState::capture(before)?;
        let new = PointsState::capture(now)?;
        return (old != new).then_some(Command::ResizePoints { id, old, new });
    }
    if before.is_segment() {
        let old = SegmentState::capture(before)?;
        let new = SegmentState::capture(now)?;
        return (old != new).then_some(Command::Endpoints { id, old, new });
    }
    if before.size() != now.size() {
        return Some(Command::Resize {
            id,
            old_position: before.position,
            new_position: now.position,
            old_size: before.size(),
            new_size: now.size(),
        });
    }
    (before.position != now.position).then(|| Command::Move {
        id,
        old: before.position,
        new: now.position,
    })
}
