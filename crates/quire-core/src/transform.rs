//! Pure resize, scale and rotation math used by the transform engine.

use crate::handles::ResizeEdges;
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Smallest size a group child may be scaled down to.
pub const MIN_CHILD_SIZE: f64 = 1.0;

/// Radius below which a rotation angle is undefined.
const MIN_ROTATE_RADIUS: f64 = 1e-6;

/// Resize a box by dragging the given edges by `delta`.
///
/// Each dimension is clamped to `min_size`; when clamped, the dragged side
/// stops so that the opposite side stays where it was.
pub fn resize_box(start: Rect, edges: ResizeEdges, delta: Vec2, min_size: f64) -> Rect {
    let (mut x, mut y) = (start.x0, start.y0);
    let (mut w, mut h) = (start.width(), start.height());

    if edges.left {
        x = start.x0 + delta.x;
        w = start.width() - delta.x;
    }
    if edges.right {
        w = start.width() + delta.x;
    }
    if edges.top {
        y = start.y0 + delta.y;
        h = start.height() - delta.y;
    }
    if edges.bottom {
        h = start.height() + delta.y;
    }

    if w < min_size {
        w = min_size;
        if edges.left {
            x = start.x0 + start.width() - min_size;
        }
    }
    if h < min_size {
        h = min_size;
        if edges.top {
            y = start.y0 + start.height() - min_size;
        }
    }
    Rect::from_origin_size((x, y), (w, h))
}

/// Per-axis scale from `start` to `new`; 1 on an axis with zero start extent.
pub fn scale_factors(start: Size, new: Size) -> Vec2 {
    let sx = if start.width > 0.0 { new.width / start.width } else { 1.0 };
    let sy = if start.height > 0.0 { new.height / start.height } else { 1.0 };
    Vec2::new(sx, sy)
}

pub fn scale_points(points: &[Point], scale: Vec2) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(p.x * scale.x, p.y * scale.y))
        .collect()
}

/// Child position after its group moved from `group_start` to `group_new`
/// and scaled by `scale`: the offset from the group origin scales with it.
pub fn scale_child_position(
    child_start: Point,
    group_start: Point,
    group_new: Point,
    scale: Vec2,
) -> Point {
    let rel = child_start - group_start;
    group_new + Vec2::new(rel.x * scale.x, rel.y * scale.y)
}

pub fn scale_child_size(start: Size, scale: Vec2) -> Size {
    Size::new(
        (start.width * scale.x).max(MIN_CHILD_SIZE),
        (start.height * scale.y).max(MIN_CHILD_SIZE),
    )
}

/// Rotate `point` about `center` by `degrees` (clockwise on screen).
pub fn rotate_about(point: Point, center: Point, degrees: f64) -> Point {
    Affine::rotate_about(degrees.to_radians(), center) * point
}

/// Angle swept around `center` from `start` to `current`, in degrees,
/// normalized to (-180, 180]. None when either point sits on the center.
pub fn rotation_delta(center: Point, start: Point, current: Point) -> Option<f64> {
    let a = start - center;
    let b = current - center;
    if a.hypot() < MIN_ROTATE_RADIUS || b.hypot() < MIN_ROTATE_RADIUS {
        return None;
    }
    let delta = (b.y.atan2(b.x) - a.y.atan2(a.x)).to_degrees();
    let mut wrapped = delta.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped -= 360.0;
    }
    Some(wrapped)
}

/// Linear part (rotation after flip) of a placement.
pub fn frame_linear(rotation: f64, flip_h: bool, flip_v: bool) -> Affine {
    let sx = if flip_h { -1.0 } else { 1.0 };
    let sy = if flip_v { -1.0 } else { 1.0 };
    Affine::rotate(rotation.to_radians()) * Affine::scale_non_uniform(sx, sy)
}

/// Position and end vector of a segment whose placed endpoints must land on
/// `page_start` and `page_end`, keeping rotation and flip.
pub fn segment_from_page(
    rotation: f64,
    flip_h: bool,
    flip_v: bool,
    page_start: Point,
    page_end: Point,
) -> (Point, Vec2) {
    let linear = frame_linear(rotation, flip_h, flip_v);
    let end = linear.inverse() * (page_end - page_start).to_point();
    let half = end.to_vec2() / 2.0;
    let position = page_start - half + (linear * half.to_point()).to_vec2();
    (position, end.to_vec2())
}
