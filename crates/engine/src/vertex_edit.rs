//! CAD-style constraint edits on Floor/Fence control points.
//!
//! Points live in the item's local ground plane. Angles are measured with
//! `atan2(z, x)`, so a positive rotation turns +X toward +Z.

use kurbo::{Point, Vec2};
use serde::Serialize;
use shared::Point2;

use crate::state::VertexSelection;

/// Positions closer than this are treated as coincident
const COINCIDENT_EPS: f64 = 1e-9;

/// Read-only measurement of the current vertex selection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VertexReadout {
    pub selection: Vec<usize>,
    /// Distance between reference and pivot (2+ selected)
    pub distance: Option<f64>,
    /// Unsigned angle at the pivot in degrees (3 selected)
    pub angle: Option<f64>,
}

fn kp(p: &Point2) -> Point {
    Point::new(p.x, p.z)
}

fn from_kp(p: Point) -> Point2 {
    Point2::new(p.x, p.y)
}

/// Unsigned angle in degrees between `a - pivot` and `b - pivot`
pub fn angle_at(a: &Point2, pivot: &Point2, b: &Point2) -> Option<f64> {
    let u = kp(a) - kp(pivot);
    let v = kp(b) - kp(pivot);
    if u.hypot() < COINCIDENT_EPS || v.hypot() < COINCIDENT_EPS {
        return None;
    }
    Some(u.cross(v).abs().atan2(u.dot(v)).to_degrees())
}

pub fn readout(points: &[Point2], selection: &VertexSelection) -> VertexReadout {
    let at = |i: Option<usize>| i.and_then(|i| points.get(i));
    let reference = at(selection.reference());
    let pivot = at(selection.pivot());

    let distance = match (reference, pivot) {
        (Some(a), Some(b)) => Some(a.distance(b)),
        _ => None,
    };
    let angle = match (reference, pivot, at(selection.movable())) {
        (Some(a), Some(p), Some(b)) => angle_at(a, p, b),
        _ => None,
    };

    VertexReadout {
        selection: selection.indices().to_vec(),
        distance,
        angle,
    }
}

/// Move `points[movable]` along the anchor→movable direction so that its
/// distance to `points[anchor]` becomes `length`.
///
/// No-op (returns false) for non-positive or non-finite lengths, invalid or
/// equal indices, and coincident points (no direction to preserve).
pub fn apply_distance(points: &mut [Point2], movable: usize, anchor: usize, length: f64) -> bool {
    if !(length > 0.0) || !length.is_finite() || movable == anchor {
        return false;
    }
    let (Some(m), Some(a)) = (points.get(movable), points.get(anchor)) else {
        return false;
    };
    let delta = kp(m) - kp(a);
    let current = delta.hypot();
    if current < COINCIDENT_EPS {
        return false;
    }
    let moved = kp(a) + delta * (length / current);
    points[movable] = from_kp(moved);
    true
}

/// Rotate the movable point about the pivot so that it sits `degrees` away
/// from the reference direction, keeping its distance to the pivot.
///
/// Requires exactly three selected points and `0 < degrees <= 180`; anything
/// else (or a degenerate reference/movable vector) is a no-op returning false.
pub fn apply_angle(points: &mut [Point2], selection: &VertexSelection, degrees: f64) -> bool {
    if !(degrees > 0.0 && degrees <= 180.0) {
        return false;
    }
    let (Some(r), Some(p), Some(m)) = (
        selection.reference(),
        selection.pivot(),
        selection.movable(),
    ) else {
        return false;
    };
    let (Some(reference), Some(pivot), Some(mov)) = (points.get(r), points.get(p), points.get(m))
    else {
        return false;
    };

    let ref_vec = kp(reference) - kp(pivot);
    let mov_vec = kp(mov) - kp(pivot);
    let radius = mov_vec.hypot();
    if ref_vec.hypot() < COINCIDENT_EPS || radius < COINCIDENT_EPS {
        return false;
    }

    let new_angle = ref_vec.atan2() + degrees.to_radians();
    let moved = kp(pivot) + Vec2::from_angle(new_angle) * radius;
    points[m] = from_kp(moved);
    true
}
