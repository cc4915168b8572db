//! Drawable items.
//!
//! Every item shares one placement header (position, rotation, flip, z,
//! visibility) and carries a type-specific payload in [`ItemKind`]. The
//! engine dispatches on the payload tag for the few geometric operations it
//! needs: read/write the size, read/write the point list, read/write the
//! segment end.

mod hit;
mod style;

pub use hit::{point_in_polygon, point_to_polyline_dist, point_to_segment_dist};
pub use style::{ItemStyle, SerializableColor};

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for items.
pub type ItemId = Uuid;

/// Default arrow head size.
pub const DEFAULT_HEAD_SIZE: f64 = 12.0;

/// Type-specific payload of an item. All coordinates are local to the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Rect {
        width: f64,
        height: f64,
        #[serde(default)]
        corner_radius: f64,
    },
    Ellipse {
        width: f64,
        height: f64,
    },
    Text {
        width: f64,
        height: f64,
        text: String,
        font_size: f64,
    },
    Image {
        width: f64,
        height: f64,
        #[serde(default)]
        source: String,
    },
    /// Segment from the local origin to `end`.
    Line { end: Vec2 },
    /// Segment from the local origin to `end`, with a head at `end`.
    Arrow {
        end: Vec2,
        #[serde(default = "default_head_size")]
        head_size: f64,
    },
    /// Closed polygon. Points are normalized so their minimum is (0, 0).
    Polygon {
        points: Vec<Point>,
        width: f64,
        height: f64,
    },
    /// Open polyline, normalized like a polygon.
    Freehand {
        points: Vec<Point>,
        width: f64,
        height: f64,
    },
    /// Composite item. Width/height are derived from the children.
    Group {
        children: Vec<ItemId>,
        width: f64,
        height: f64,
    },
}

fn default_head_size() -> f64 {
    DEFAULT_HEAD_SIZE
}

fn default_true() -> bool {
    true
}

/// One drawable object on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub(crate) id: ItemId,
    /// Page position of the local origin.
    pub position: Point,
    /// Rotation in degrees, clockwise on screen, about the local bounds center.
    #[serde(default)]
    pub rotation: f64,
    /// Stacking order; higher draws on top.
    #[serde(default)]
    pub z: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub flip_h: bool,
    #[serde(default)]
    pub flip_v: bool,
    #[serde(default)]
    pub style: ItemStyle,
    pub kind: ItemKind,
}

impl Item {
    /// Create an item with default header values.
    pub fn new(position: Point, kind: ItemKind) -> Self {
        let style = match kind {
            ItemKind::Line { .. } | ItemKind::Arrow { .. } | ItemKind::Freehand { .. } => {
                ItemStyle::outline(2.0)
            }
            ItemKind::Group { .. } | ItemKind::Text { .. } => ItemStyle::invisible(),
            _ => ItemStyle::default(),
        };
        Self {
            id: Uuid::new_v4(),
            position,
            rotation: 0.0,
            z: 0.0,
            visible: true,
            locked: false,
            flip_h: false,
            flip_v: false,
            style,
            kind,
        }
    }

    pub fn rect(position: Point, width: f64, height: f64) -> Self {
        Self::new(
            position,
            ItemKind::Rect {
                width,
                height,
                corner_radius: 0.0,
            },
        )
    }

    pub fn ellipse(position: Point, width: f64, height: f64) -> Self {
        Self::new(position, ItemKind::Ellipse { width, height })
    }

    pub fn text(position: Point, width: f64, height: f64, text: impl Into<String>) -> Self {
        Self::new(
            position,
            ItemKind::Text {
                width,
                height,
                text: text.into(),
                font_size: 12.0,
            },
        )
    }

    pub fn image(position: Point, width: f64, height: f64, source: impl Into<String>) -> Self {
        Self::new(
            position,
            ItemKind::Image {
                width,
                height,
                source: source.into(),
            },
        )
    }

    /// Line between two page points. The start becomes the item position.
    pub fn line(start: Point, end: Point) -> Self {
        Self::new(start, ItemKind::Line { end: end - start })
    }

    /// Arrow between two page points, head at `end`.
    pub fn arrow(start: Point, end: Point) -> Self {
        Self::new(
            start,
            ItemKind::Arrow {
                end: end - start,
                head_size: DEFAULT_HEAD_SIZE,
            },
        )
    }

    /// Polygon through the given page points.
    pub fn polygon(page_points: Vec<Point>) -> Self {
        let (origin, points, size) = normalize_points(&page_points);
        Self::new(
            origin,
            ItemKind::Polygon {
                points,
                width: size.width,
                height: size.height,
            },
        )
    }

    /// Freehand stroke through the given page points.
    pub fn freehand(page_points: Vec<Point>) -> Self {
        let (origin, points, size) = normalize_points(&page_points);
        Self::new(
            origin,
            ItemKind::Freehand {
                points,
                width: size.width,
                height: size.height,
            },
        )
    }

    /// Group occupying `bounds`. Only the scene creates groups.
    pub(crate) fn group(children: Vec<ItemId>, bounds: Rect) -> Self {
        Self::new(
            bounds.origin(),
            ItemKind::Group {
                children,
                width: bounds.width(),
                height: bounds.height(),
            },
        )
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Short type name, used in logs and command labels.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ItemKind::Rect { .. } => "rect",
            ItemKind::Ellipse { .. } => "ellipse",
            ItemKind::Text { .. } => "text",
            ItemKind::Image { .. } => "image",
            ItemKind::Line { .. } => "line",
            ItemKind::Arrow { .. } => "arrow",
            ItemKind::Polygon { .. } => "polygon",
            ItemKind::Freehand { .. } => "freehand",
            ItemKind::Group { .. } => "group",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ItemKind::Group { .. })
    }

    /// Items whose geometry is a plain width/height box.
    pub fn is_rect_like(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Rect { .. }
                | ItemKind::Ellipse { .. }
                | ItemKind::Text { .. }
                | ItemKind::Image { .. }
        )
    }

    pub fn has_points(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Polygon { .. } | ItemKind::Freehand { .. }
        )
    }

    pub fn is_segment(&self) -> bool {
        matches!(self.kind, ItemKind::Line { .. } | ItemKind::Arrow { .. })
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self.kind, ItemKind::Polygon { .. })
    }

    /// Child IDs of a group; empty for every other kind.
    pub fn children(&self) -> &[ItemId] {
        match &self.kind {
            ItemKind::Group { children, .. } => children,
            _ => &[],
        }
    }

    /// Stored size. For segments this is the extent of the end vector.
    pub fn size(&self) -> Size {
        match &self.kind {
            ItemKind::Rect { width, height, .. }
            | ItemKind::Ellipse { width, height }
            | ItemKind::Text { width, height, .. }
            | ItemKind::Image { width, height, .. }
            | ItemKind::Polygon { width, height, .. }
            | ItemKind::Freehand { width, height, .. }
            | ItemKind::Group { width, height, .. } => Size::new(*width, *height),
            ItemKind::Line { end } | ItemKind::Arrow { end, .. } => {
                Size::new(end.x.abs(), end.y.abs())
            }
        }
    }

    /// Overwrite the stored size. Segments have no stored size and ignore it.
    pub fn set_size(&mut self, size: Size) {
        match &mut self.kind {
            ItemKind::Rect { width, height, .. }
            | ItemKind::Ellipse { width, height }
            | ItemKind::Text { width, height, .. }
            | ItemKind::Image { width, height, .. }
            | ItemKind::Polygon { width, height, .. }
            | ItemKind::Freehand { width, height, .. }
            | ItemKind::Group { width, height, .. } => {
                *width = size.width;
                *height = size.height;
            }
            ItemKind::Line { .. } | ItemKind::Arrow { .. } => {}
        }
    }

    pub fn points(&self) -> Option<&[Point]> {
        match &self.kind {
            ItemKind::Polygon { points, .. } | ItemKind::Freehand { points, .. } => Some(points),
            _ => None,
        }
    }

    /// Replace the local point list. Returns false for kinds without points.
    pub fn set_points(&mut self, new_points: Vec<Point>) -> bool {
        match &mut self.kind {
            ItemKind::Polygon { points, .. } | ItemKind::Freehand { points, .. } => {
                *points = new_points;
                true
            }
            _ => false,
        }
    }

    pub fn segment_end(&self) -> Option<Vec2> {
        match &self.kind {
            ItemKind::Line { end } | ItemKind::Arrow { end, .. } => Some(*end),
            _ => None,
        }
    }

    pub fn set_segment_end(&mut self, new_end: Vec2) -> bool {
        match &mut self.kind {
            ItemKind::Line { end } | ItemKind::Arrow { end, .. } => {
                *end = new_end;
                true
            }
            _ => false,
        }
    }

    /// Bounds in local coordinates.
    pub fn local_bounds(&self) -> Rect {
        match &self.kind {
            ItemKind::Line { end } | ItemKind::Arrow { end, .. } => {
                Rect::from_points(Point::ZERO, end.to_point())
            }
            ItemKind::Polygon { points, .. } | ItemKind::Freehand { points, .. }
                if !points.is_empty() =>
            {
                points_bbox(points)
            }
            _ => self.size().to_rect(),
        }
    }

    /// Flip and rotation about the local bounds center, flip applied first.
    /// Groups stay axis-aligned.
    pub fn local_frame(&self) -> Affine {
        if self.is_group() {
            return Affine::IDENTITY;
        }
        let center = self.local_bounds().center();
        let sx = if self.flip_h { -1.0 } else { 1.0 };
        let sy = if self.flip_v { -1.0 } else { 1.0 };
        let flip = Affine::translate(center.to_vec2())
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate(-center.to_vec2());
        Affine::rotate_about(self.rotation.to_radians(), center) * flip
    }

    /// Local → page transform.
    pub fn placement(&self) -> Affine {
        Affine::translate(self.position.to_vec2()) * self.local_frame()
    }

    /// Axis-aligned bounding box of the placed item in page space.
    pub fn page_bounds(&self) -> Rect {
        self.placement().transform_rect_bbox(self.local_bounds())
    }

    /// Center of the local bounds in page space (invariant under rotation/flip).
    pub fn page_center(&self) -> Point {
        self.position + self.local_bounds().center().to_vec2()
    }

    pub fn map_to_local(&self, point: Point) -> Point {
        self.placement().inverse() * point
    }

    pub fn map_to_page(&self, point: Point) -> Point {
        self.placement() * point
    }

    /// Page-space segment endpoints of a line or arrow.
    pub fn segment_page_points(&self) -> Option<(Point, Point)> {
        let end = self.segment_end()?;
        let placement = self.placement();
        Some((placement * Point::ZERO, placement * end.to_point()))
    }

    /// Check whether a page point lies on the item's shape.
    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        let local = self.map_to_local(point);
        let half_stroke = self.style.stroke_width.max(0.0) / 2.0;
        match &self.kind {
            ItemKind::Rect { .. } | ItemKind::Text { .. } | ItemKind::Image { .. } => self
                .local_bounds()
                .inflate(tolerance, tolerance)
                .contains(local),
            ItemKind::Ellipse { width, height } => {
                let rx = width / 2.0 + tolerance;
                let ry = height / 2.0 + tolerance;
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let dx = (local.x - width / 2.0) / rx;
                let dy = (local.y - height / 2.0) / ry;
                dx * dx + dy * dy <= 1.0
            }
            ItemKind::Polygon { points, .. } => {
                if point_in_polygon(local, points) {
                    return true;
                }
                let mut closed = points.clone();
                if let Some(first) = points.first() {
                    closed.push(*first);
                }
                point_to_polyline_dist(local, &closed) <= tolerance + half_stroke
            }
            ItemKind::Freehand { points, .. } => {
                point_to_polyline_dist(local, points) <= tolerance + half_stroke
            }
            ItemKind::Line { end } | ItemKind::Arrow { end, .. } => {
                point_to_segment_dist(local, Point::ZERO, end.to_point()) <= tolerance + half_stroke
            }
            ItemKind::Group { .. } => false,
        }
    }
}

/// Bounding box of a non-empty point list.
pub(crate) fn points_bbox(points: &[Point]) -> Rect {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return Rect::ZERO;
    };
    iter.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}

/// Shift points so their minimum is (0, 0). Returns (minimum, shifted points, extent).
pub(crate) fn normalize_points(points: &[Point]) -> (Point, Vec<Point>, Size) {
    if points.is_empty() {
        return (Point::ZERO, Vec::new(), Size::ZERO);
    }
    let bbox = points_bbox(points);
    let origin = bbox.origin();
    let shifted = points.iter().map(|p| *p - origin.to_vec2()).collect();
    (origin, shifted, bbox.size())
}
