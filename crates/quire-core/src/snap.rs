//! Angle snapping for shift-constrained rotation and line endpoints.

use kurbo::{Point, Vec2};

/// Default angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Segments shorter than this have no meaningful angle.
const MIN_SEGMENT_LENGTH: f64 = 1e-3;

/// A line endpoint after angle snapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointSnap {
    pub point: Point,
    /// Angle of the segment in degrees, in [0, 360).
    pub angle: f64,
    pub snapped: bool,
}

fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid yields 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

fn round_to(value: f64, increment: f64) -> f64 {
    (value / increment).round() * increment
}

/// Absolute angle rounded to the nearest `increment`, in [0, 360).
pub fn snap_angle(angle: f64, increment: f64) -> f64 {
    if increment > 0.0 {
        wrap_degrees(round_to(angle, increment))
    } else {
        wrap_degrees(angle)
    }
}

/// Signed rotation delta rounded to the nearest `increment`.
pub fn snap_rotation_delta(delta: f64, increment: f64) -> f64 {
    if increment > 0.0 {
        round_to(delta, increment)
    } else {
        delta
    }
}

/// Rotate `end` about `start` onto the nearest `increment` direction,
/// keeping the segment length. A zero-length segment or a non-positive
/// increment leaves `end` alone.
pub fn snap_line_endpoint(start: Point, end: Point, increment: f64) -> EndpointSnap {
    let offset = end - start;
    let length = offset.hypot();
    let angle = wrap_degrees(offset.angle().to_degrees());
    if length < MIN_SEGMENT_LENGTH || increment <= 0.0 {
        return EndpointSnap {
            point: end,
            angle,
            snapped: false,
        };
    }

    let snapped = snap_angle(angle, increment);
    EndpointSnap {
        point: start + Vec2::from_angle(snapped.to_radians()) * length,
        angle: snapped,
        snapped: true,
    }
}
