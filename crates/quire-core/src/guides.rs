//! Alignment guides for snap-to-object while dragging.
//!
//! At the start of a drag, every non-dragged item contributes guide lines
//! derived from its page bounds. During the drag the dragged bounding box is
//! matched against those lines: each axis independently takes the single
//! closest match within the snap distance.

use crate::item::ItemId;
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Which guide families are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideFamilies {
    pub edges: bool,
    pub center: bool,
    pub thirds: bool,
    pub quarters: bool,
}

impl Default for GuideFamilies {
    fn default() -> Self {
        Self {
            edges: true,
            center: true,
            thirds: false,
            quarters: false,
        }
    }
}

impl GuideFamilies {
    pub fn none() -> Self {
        Self {
            edges: false,
            center: false,
            thirds: false,
            quarters: false,
        }
    }

    pub fn any(&self) -> bool {
        self.edges || self.center || self.thirds || self.quarters
    }
}

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    /// Constant y; constrains vertical movement.
    Horizontal,
    /// Constant x; constrains horizontal movement.
    Vertical,
}

/// One alignment guide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLine {
    pub axis: GuideAxis,
    /// The y (horizontal) or x (vertical) coordinate.
    pub value: f64,
    /// Item that generated the guide.
    pub source: ItemId,
    /// Page bounds of the source item.
    pub source_rect: Rect,
}

/// Result of matching a dragged box against the guides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapCorrection {
    pub dx: f64,
    pub dy: f64,
    /// Matched guides: vertical ones first, then horizontal ones.
    pub active: Vec<GuideLine>,
}

impl SnapCorrection {
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }

    pub fn is_snapped(&self) -> bool {
        !self.active.is_empty()
    }
}

/// Reference coordinates of a box along each axis for the enabled families.
fn reference_values(rect: Rect, families: GuideFamilies) -> (Vec<f64>, Vec<f64>) {
    let (w, h) = (rect.width(), rect.height());
    let center = rect.center();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    if families.edges {
        xs.extend([rect.x0, rect.x1]);
        ys.extend([rect.y0, rect.y1]);
    }
    if families.center {
        xs.push(center.x);
        ys.push(center.y);
    }
    if families.thirds {
        xs.extend([rect.x0 + w / 3.0, rect.x0 + 2.0 * w / 3.0]);
        ys.extend([rect.y0 + h / 3.0, rect.y0 + 2.0 * h / 3.0]);
    }
    if families.quarters {
        xs.extend([rect.x0 + w / 4.0, rect.x0 + 3.0 * w / 4.0]);
        ys.extend([rect.y0 + h / 4.0, rect.y0 + 3.0 * h / 4.0]);
    }
    (xs, ys)
}

/// Closest match on one axis.
struct AxisMatch {
    best_dist: f64,
    delta: Option<f64>,
    active: Vec<GuideLine>,
}

impl AxisMatch {
    fn new(snap_distance: f64) -> Self {
        Self {
            best_dist: snap_distance + 1.0,
            delta: None,
            active: Vec::new(),
        }
    }

    fn consider(&mut self, guide: &GuideLine, refs: &[f64], snap_distance: f64) {
        for &reference in refs {
            let dist = (reference - guide.value).abs();
            if dist > snap_distance {
                continue;
            }
            if dist < self.best_dist {
                self.best_dist = dist;
                self.delta = Some(guide.value - reference);
                self.active.clear();
                self.active.push(*guide);
            } else if dist == self.best_dist {
                self.active.push(*guide);
            }
        }
    }
}

/// Guide generation and snap matching for one drag gesture at a time.
#[derive(Debug, Default)]
pub struct GuideEngine {
    guides: Vec<GuideLine>,
    families: GuideFamilies,
    active: Vec<GuideLine>,
}

impl GuideEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Precompute guides from the non-dragged items' page bounds.
    /// Generates nothing when `snap_distance <= 0`.
    pub fn begin(
        &mut self,
        candidates: impl IntoIterator<Item = (ItemId, Rect)>,
        families: GuideFamilies,
        snap_distance: f64,
    ) {
        self.end();
        self.families = families;
        if snap_distance <= 0.0 {
            return;
        }
        for (source, rect) in candidates {
            let (xs, ys) = reference_values(rect, families);
            let vertical = xs.into_iter().map(|value| (GuideAxis::Vertical, value));
            let horizontal = ys.into_iter().map(|value| (GuideAxis::Horizontal, value));
            self.guides.extend(vertical.chain(horizontal).map(|(axis, value)| GuideLine {
                axis,
                value,
                source,
                source_rect: rect,
            }));
        }
        log::debug!("Generated {} alignment guides", self.guides.len());
    }

    /// Match a dragged box against the guides and remember the active set.
    pub fn compute_snap(&mut self, dragged: Rect, snap_distance: f64) -> SnapCorrection {
        if self.guides.is_empty() || snap_distance <= 0.0 {
            self.active.clear();
            return SnapCorrection::default();
        }

        let families = if self.families.any() {
            self.families
        } else {
            GuideFamilies {
                edges: true,
                center: true,
                ..GuideFamilies::none()
            }
        };
        let (x_refs, y_refs) = reference_values(dragged, families);

        let mut x_match = AxisMatch::new(snap_distance);
        let mut y_match = AxisMatch::new(snap_distance);
        for guide in &self.guides {
            match guide.axis {
                GuideAxis::Vertical => x_match.consider(guide, &x_refs, snap_distance),
                GuideAxis::Horizontal => y_match.consider(guide, &y_refs, snap_distance),
            }
        }

        let mut active = x_match.active;
        active.extend(y_match.active);
        self.active = active.clone();
        SnapCorrection {
            dx: x_match.delta.unwrap_or(0.0),
            dy: y_match.delta.unwrap_or(0.0),
            active,
        }
    }

    /// Guides matched by the last `compute_snap`, for rendering.
    pub fn active_guides(&self) -> &[GuideLine] {
        &self.active
    }

    /// All precomputed guides.
    pub fn guides(&self) -> &[GuideLine] {
        &self.guides
    }

    /// Discard all guides. Safe to call at any time.
    pub fn end(&mut self) {
        self.guides.clear();
        self.active.clear();
    }
}
