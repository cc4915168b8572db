//! Resize, rotate, endpoint and vertex handles.
//!
//! Handle positions are in page space, derived from the target's current
//! geometry every time they are requested.

use crate::item::Item;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;

/// Distance above the top-center handle at which the rotate handle sits.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner resize handle.
    Corner(Corner),
    /// Edge midpoint resize handle.
    Edge(Edge),
    /// Rotation handle (above the top edge).
    Rotate,
    /// Line/arrow endpoint (0 = start, 1 = end).
    Endpoint(usize),
    /// Polygon vertex in vertex-edit mode.
    Vertex(usize),
}

/// Which sides of the box a resize handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeEdges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl HandleKind {
    /// The eight resize handles in display order: top row, middle row, bottom row.
    pub const RESIZE: [HandleKind; 8] = [
        HandleKind::Corner(Corner::TopLeft),
        HandleKind::Edge(Edge::Top),
        HandleKind::Corner(Corner::TopRight),
        HandleKind::Edge(Edge::Left),
        HandleKind::Edge(Edge::Right),
        HandleKind::Corner(Corner::BottomLeft),
        HandleKind::Edge(Edge::Bottom),
        HandleKind::Corner(Corner::BottomRight),
    ];

    /// Sides moved by this handle, or None for non-resize handles.
    pub fn resize_edges(self) -> Option<ResizeEdges> {
        let (left, right, top, bottom) = match self {
            HandleKind::Corner(Corner::TopLeft) => (true, false, true, false),
            HandleKind::Corner(Corner::TopRight) => (false, true, true, false),
            HandleKind::Corner(Corner::BottomLeft) => (true, false, false, true),
            HandleKind::Corner(Corner::BottomRight) => (false, true, false, true),
            HandleKind::Edge(Edge::Top) => (false, false, true, false),
            HandleKind::Edge(Edge::Bottom) => (false, false, false, true),
            HandleKind::Edge(Edge::Left) => (true, false, false, false),
            HandleKind::Edge(Edge::Right) => (false, true, false, false),
            HandleKind::Rotate | HandleKind::Endpoint(_) | HandleKind::Vertex(_) => return None,
        };
        Some(ResizeEdges {
            left,
            right,
            top,
            bottom,
        })
    }

    /// Position of the handle on a `width` × `height` local box.
    fn local_anchor(self, width: f64, height: f64) -> Option<Point> {
        let edges = self.resize_edges()?;
        let x = if edges.left {
            0.0
        } else if edges.right {
            width
        } else {
            width / 2.0
        };
        let y = if edges.top {
            0.0
        } else if edges.bottom {
            height
        } else {
            height / 2.0
        };
        Some(Point::new(x, y))
    }
}

/// A handle with its page position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in page coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a page point hits this handle.
    /// `tolerance` should already be divided by the view scale.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// Handles for a selected item: two endpoints plus rotate for lines and
/// arrows, eight resize handles plus rotate for everything else.
pub fn item_handles(item: &Item) -> Vec<Handle> {
    if let Some((start, end)) = item.segment_page_points() {
        let top_center = item.map_to_page(Point::new(
            item.local_bounds().center().x,
            item.local_bounds().y0,
        ));
        return vec![
            Handle::new(start, HandleKind::Endpoint(0)),
            Handle::new(end, HandleKind::Endpoint(1)),
            rotate_handle(top_center),
        ];
    }

    let bounds = item.local_bounds();
    let mut handles: Vec<Handle> = HandleKind::RESIZE
        .iter()
        .filter_map(|&kind| {
            let local = kind.local_anchor(bounds.width(), bounds.height())?;
            let position = item.map_to_page(local + bounds.origin().to_vec2());
            Some(Handle::new(position, kind))
        })
        .collect();
    let top_center = handles
        .iter()
        .find(|h| h.kind == HandleKind::Edge(Edge::Top))
        .map(|h| h.position)
        .unwrap_or_else(|| item.page_center());
    handles.push(rotate_handle(top_center));
    handles
}

fn rotate_handle(top_center: Point) -> Handle {
    Handle::new(
        top_center + Vec2::new(0.0, -ROTATE_HANDLE_OFFSET),
        HandleKind::Rotate,
    )
}

/// One handle per polygon vertex, in point order.
pub fn vertex_handles(item: &Item) -> Vec<Handle> {
    let placement = item.placement();
    item.points()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, p)| Handle::new(placement * *p, HandleKind::Vertex(i)))
        .collect()
}

/// The handle closest to `point` within `tolerance`, if any.
pub fn hit_handle(handles: &[Handle], point: Point, tolerance: f64) -> Option<HandleKind> {
    handles
        .iter()
        .filter(|h| h.hit_test(point, tolerance))
        .min_by(|a, b| {
            (point - a.position)
                .hypot2()
                .total_cmp(&(point - b.position).hypot2())
        })
        .map(|h| h.kind)
}
