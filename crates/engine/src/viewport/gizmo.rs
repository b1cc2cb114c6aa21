use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{ItemId, Transform};

use super::mesh::{push_line_vert, LineMeshData};
use super::picking::{ray_ground, Ray};
use crate::helpers::{transform_position, with_position};

/// Which axis a gizmo handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    pub fn direction(&self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
        }
    }

    fn color(&self) -> [f32; 4] {
        match self {
            GizmoAxis::X => [0.9, 0.2, 0.2, 1.0],
            GizmoAxis::Y => [0.2, 0.8, 0.2, 1.0],
            GizmoAxis::Z => [0.2, 0.3, 0.9, 1.0],
        }
    }
}

/// What the pointer grabbed when a drag started
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragHandle {
    /// Constrained to one axis
    Axis(GizmoAxis),
    /// Object body: slide on the horizontal plane through the object origin
    Ground,
}

#[derive(Debug, Clone)]
struct DragState {
    handle: DragHandle,
    start_transform: Transform,
    /// Axis parameter (axis drags) or plane hit (ground drags) at drag start
    start_param: f32,
    start_hit: Vec3,
}

/// Translation manipulator attached to at most one item
#[derive(Debug, Clone)]
pub struct Manipulator {
    attached: Option<ItemId>,
    drag: Option<DragState>,
    pub axis_length: f32,
    pub pick_threshold: f32,
}

impl Default for Manipulator {
    fn default() -> Self {
        Self::new(1.0, 0.15)
    }
}

impl Manipulator {
    pub fn new(axis_length: f32, pick_threshold: f32) -> Self {
        Self {
            attached: None,
            drag: None,
            axis_length,
            pick_threshold,
        }
    }

    pub fn attach(&mut self, id: ItemId) {
        if self.attached.as_deref() != Some(id.as_str()) {
            self.drag = None;
        }
        self.attached = Some(id);
    }

    /// Detach and abandon any drag in progress
    pub fn detach(&mut self) {
        self.attached = None;
        self.drag = None;
    }

    pub fn attached(&self) -> Option<&str> {
        self.attached.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active_handle(&self) -> Option<DragHandle> {
        self.drag.as_ref().map(|d| d.handle)
    }

    /// Axis handle under the ray, if any
    pub fn hit_test(&self, ray: &Ray, center: Vec3) -> Option<GizmoAxis> {
        gizmo_hit_test(ray, center, self.axis_length, self.pick_threshold)
    }

    /// Start dragging the attached item. Returns false when nothing is
    /// attached or the ray cannot produce a drag reference.
    pub fn begin_drag(&mut self, ray: &Ray, handle: DragHandle, transform: &Transform) -> bool {
        if self.attached.is_none() {
            return false;
        }
        let origin = transform_position(transform);
        let (start_param, start_hit) = match handle {
            DragHandle::Axis(axis) => {
                let Some(t) = closest_axis_param(ray, origin, axis.direction()) else {
                    return false;
                };
                (t, origin)
            }
            DragHandle::Ground => {
                let Some(hit) = ray_ground(ray, origin.y) else {
                    return false;
                };
                (0.0, hit)
            }
        };
        self.drag = Some(DragState {
            handle,
            start_transform: transform.clone(),
            start_param,
            start_hit,
        });
        true
    }

    /// Transform of the dragged item for the current pointer ray
    pub fn drag_to(&self, ray: &Ray) -> Option<Transform> {
        let drag = self.drag.as_ref()?;
        let start = transform_position(&drag.start_transform);
        let position = match drag.handle {
            DragHandle::Axis(axis) => {
                let t = closest_axis_param(ray, start, axis.direction())?;
                start + axis.direction() * (t - drag.start_param)
            }
            DragHandle::Ground => {
                let hit = ray_ground(ray, start.y)?;
                let delta = hit - drag.start_hit;
                start + Vec3::new(delta.x, 0.0, delta.z)
            }
        };
        position
            .is_finite()
            .then(|| with_position(&drag.start_transform, position))
    }

    /// Finish the drag, returning the transform the item had when it started
    pub fn end_drag(&mut self) -> Option<Transform> {
        self.drag.take().map(|d| d.start_transform)
    }
}

/// Test if a ray hits one of the gizmo axes.
/// Returns the closest axis whose segment passes within `threshold` of the ray.
pub fn gizmo_hit_test(ray: &Ray, center: Vec3, axis_length: f32, threshold: f32) -> Option<GizmoAxis> {
    let mut best: Option<(GizmoAxis, f32)> = None;

    for axis in GizmoAxis::ALL {
        let dist = ray_line_distance(ray, center, center + axis.direction() * axis_length);
        if dist < threshold && best.as_ref().is_none_or(|(_, d)| dist < *d) {
            best = Some((axis, dist));
        }
    }

    best.map(|(axis, _)| axis)
}

/// Build gizmo line mesh at the given center point.
pub fn build_gizmo_lines(center: Vec3, length: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let arrow = length * 0.15;

    for axis in GizmoAxis::ALL {
        let dir = axis.direction();
        let color = axis.color();
        let tip = center + dir * length;
        // Any axis perpendicular to `dir` for the arrowhead
        let side = if axis == GizmoAxis::Y { Vec3::X } else { Vec3::Y };

        push_line_vert(&mut vertices, center, color);
        push_line_vert(&mut vertices, tip, color);
        for sign in [1.0, -1.0] {
            push_line_vert(&mut vertices, tip, color);
            push_line_vert(&mut vertices, tip - dir * arrow + side * (arrow * 0.5 * sign), color);
        }
    }

    LineMeshData { vertices }
}

/// Parameter along the infinite line `origin + dir * t` closest to the ray.
/// None when the ray is (nearly) parallel to the line.
fn closest_axis_param(ray: &Ray, origin: Vec3, dir: Vec3) -> Option<f32> {
    let u = ray.direction;
    let w = ray.origin - origin;

    let a = u.dot(u);
    let b = u.dot(dir);
    let c = dir.dot(dir);
    let d = u.dot(w);
    let e = dir.dot(w);

    let denom = a * c - b * b;
    if denom < 1e-6 {
        return None;
    }
    Some((a * e - b * d) / denom)
}

/// Minimum distance between a ray and a line segment.
fn ray_line_distance(ray: &Ray, line_start: Vec3, line_end: Vec3) -> f32 {
    let u = ray.direction;
    let v = line_end - line_start;
    let w = ray.origin - line_start;

    let a = u.dot(u);
    let b = u.dot(v);
    let c = v.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);

    let denom = a * c - b * b;

    let (sc, tc) = if denom < 1e-7 {
        // Nearly parallel
        (0.0, if b > c { d / b } else { e / c })
    } else {
        ((b * e - c * d) / denom, (a * e - b * d) / denom)
    };

    let tc = tc.clamp(0.0, 1.0);
    let sc = sc.max(0.0);

    ((ray.origin + u * sc) - (line_start + v * tc)).length()
}
