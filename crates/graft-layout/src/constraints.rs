//! Constraint-based placement of children in non-layout containers.

use glam::Vec2;
use graft_core::{ConstraintKind, LayoutConstraints, Placement, Transform};

/// Anchors and offsets along one axis: (anchor_min, anchor_max, offset_min, offset_max).
fn axis(kind: ConstraintKind, pos: f32, size: f32, parent: f32) -> (f32, f32, f32, f32) {
    let end = pos + size;
    match kind {
        ConstraintKind::Scale if parent > 0.0 => (pos / parent, end / parent, 0.0, 0.0),
        ConstraintKind::Min | ConstraintKind::Scale => (0.0, 0.0, pos, end),
        ConstraintKind::Max => (1.0, 1.0, pos - parent, end - parent),
        ConstraintKind::Center => {
            let center = parent / 2.0;
            (0.5, 0.5, pos - center, end - center)
        }
        ConstraintKind::Stretch => (0.0, 1.0, pos, end - parent),
    }
}

/// Placement that reproduces `transform` inside a parent of `parent_size`
/// and follows `constraints` when the parent is resized.
///
/// Scale on a zero-sized parent axis falls back to Min.
pub fn constrained_placement(
    transform: &Transform,
    parent_size: Vec2,
    constraints: LayoutConstraints,
) -> Placement {
    let (ax0, ax1, ox0, ox1) = axis(
        constraints.horizontal,
        transform.position.x,
        transform.size.x,
        parent_size.x,
    );
    let (ay0, ay1, oy0, oy1) = axis(
        constraints.vertical,
        transform.position.y,
        transform.size.y,
        parent_size.y,
    );
    Placement {
        anchor_min: Vec2::new(ax0, ay0),
        anchor_max: Vec2::new(ax1, ay1),
        offset_min: Vec2::new(ox0, oy0),
        offset_max: Vec2::new(ox1, oy1),
        rotation: transform.rotation,
    }
}
