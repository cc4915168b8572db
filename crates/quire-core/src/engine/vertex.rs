//! Polygon vertex editing.
//!
//! While a session is open the target's vertices are individually
//! draggable. Each drag rewrites one local point, renormalizes the point
//! list so its minimum sits at the local origin, and moves the item so that
//! every vertex keeps its page position.

use super::{Gesture, TransformEngine};
use crate::handles::{HandleKind, hit_handle, vertex_handles};
use crate::history::{Command, PointsState};
use crate::item::{Item, ItemId, normalize_points};
use kurbo::{Affine, Point, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VertexSession {
    pub(crate) target: ItemId,
}

/// An in-progress drag of one vertex.
#[derive(Debug)]
pub(crate) struct VertexDrag {
    index: usize,
    /// Pointer position at press.
    start: Point,
    /// Page position of the vertex at press.
    anchor: Point,
    /// Placement of the target when the drag started.
    frozen: Affine,
    pub(super) original: Item,
}

impl TransformEngine {
    /// Polygon currently open for vertex editing.
    pub fn vertex_target(&self) -> Option<ItemId> {
        self.vertex.map(|session| session.target)
    }

    pub fn enter_vertex_mode(&mut self, id: ItemId) {
        if self.gesture.is_active() {
            self.cancel_gesture();
        }
        if !self.scene.get(id).is_some_and(Item::is_polygon) {
            log::warn!("Vertex mode needs a polygon, {id} is not one");
            return;
        }
        log::debug!("Entering vertex mode on {id}");
        self.scene.select(id);
        self.vertex = Some(VertexSession { target: id });
    }

    pub fn exit_vertex_mode(&mut self) {
        if let Some(session) = self.vertex.take() {
            log::debug!("Leaving vertex mode on {}", session.target);
        }
    }

    pub(super) fn vertex_target_contains(&self, pos: Point) -> bool {
        self.vertex_target()
            .and_then(|id| self.scene.get(id))
            .is_some_and(|item| item.contains(pos, self.hit_tolerance()))
    }

    /// Start dragging the vertex under `pos`, if any.
    pub(super) fn begin_vertex_drag(&mut self, pos: Point) -> bool {
        let Some(item) = self.vertex_target().and_then(|id| self.scene.get(id)) else {
            return false;
        };
        let handles = vertex_handles(item);
        let Some(HandleKind::Vertex(index)) = hit_handle(&handles, pos, self.handle_tolerance())
        else {
            return false;
        };
        let Some(&vertex) = item.points().and_then(|points| points.get(index)) else {
            return false;
        };
        let frozen = item.placement();
        self.gesture = Gesture::Vertex(VertexDrag {
            index,
            start: pos,
            anchor: frozen * vertex,
            frozen,
            original: item.clone(),
        });
        true
    }

    pub(super) fn update_vertex_drag(&mut self, g: &VertexDrag, pos: Point) {
        let id = g.original.id();
        let Some(original_points) = g.original.points() else {
            return;
        };
        if g.index >= original_points.len() {
            log::warn!("Vertex {} out of range for {id}, skipping", g.index);
            return;
        }

        let offset = pos - g.start;
        let mut points = original_points.to_vec();
        points[g.index] = g.frozen.inverse() * (g.anchor + offset);

        let Some(item) = self.scene.get_mut(id) else {
            return;
        };
        if offset == Vec2::ZERO || points == original_points {
            *item = g.original.clone();
            return;
        }

        let (min, normalized, size) = normalize_points(&points);
        let mut candidate = g.original.clone();
        candidate.set_points(normalized);
        candidate.set_size(size);
        // Place the candidate so its local origin lands where `min` was.
        let origin_in_frame = (candidate.local_frame() * Point::ZERO).to_vec2();
        candidate.position = g.frozen * min - origin_in_frame;
        *item = candidate;
    }

    pub(super) fn commit_vertex_drag(&mut self, g: VertexDrag) {
        let id = g.original.id();
        let old = PointsState::capture(&g.original);
        let new = self.scene.get(id).and_then(PointsState::capture);
        if let (Some(old), Some(new)) = (old, new) {
            if old != new {
                self.record("Edit Vertex", vec![Command::EditVertex { id, old, new }], false);
            }
        }
    }

    pub(super) fn drop_stale_vertex_session(&mut self) {
        if let Some(id) = self.vertex_target() {
            if !self.scene.contains(id) {
                self.exit_vertex_mode();
            }
        }
    }
}
