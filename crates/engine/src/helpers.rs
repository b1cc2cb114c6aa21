//! Common helpers for transforms, planar points and readout formatting
//!
//! Shared by the synchronizer, interaction manager and collision detector so
//! that they agree on how an item's transform maps local geometry to world space.

use glam::{EulerRot, Mat4, Quat, Vec3};
use shared::{Point2, Transform};

use crate::state::settings::{DimensionSettings, Units};

/// World matrix of a transform (scale, then XYZ rotation, then translation)
pub fn transform_matrix(t: &Transform) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(t.scale[0] as f32, t.scale[1] as f32, t.scale[2] as f32),
        Quat::from_euler(
            EulerRot::XYZ,
            t.rotation[0] as f32,
            t.rotation[1] as f32,
            t.rotation[2] as f32,
        ),
        transform_position(t),
    )
}

pub fn transform_position(t: &Transform) -> Vec3 {
    Vec3::new(t.position[0] as f32, t.position[1] as f32, t.position[2] as f32)
}

/// Copy of `t` moved to `position`
pub fn with_position(t: &Transform, position: Vec3) -> Transform {
    Transform {
        position: [position.x as f64, position.y as f64, position.z as f64],
        rotation: t.rotation,
        scale: t.scale,
    }
}

/// Linear interpolation of every transform component
pub fn lerp_transform(from: &Transform, to: &Transform, t: f64) -> Transform {
    let t = t.clamp(0.0, 1.0);
    let lerp3 = |a: [f64; 3], b: [f64; 3]| {
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ]
    };
    Transform {
        position: lerp3(from.position, to.position),
        rotation: lerp3(from.rotation, to.rotation),
        scale: lerp3(from.scale, to.scale),
    }
}

/// Planar point lifted onto the ground plane
pub fn point_to_vec3(p: &Point2, y: f32) -> Vec3 {
    Vec3::new(p.x as f32, y, p.z as f32)
}

/// World position of an item-local planar point
pub fn point_to_world(p: &Point2, transform: &Transform) -> Vec3 {
    transform_matrix(transform).transform_point3(point_to_vec3(p, 0.0))
}

/// Drop the height of a world position
pub fn vec3_to_point(v: Vec3) -> Point2 {
    Point2::new(v.x as f64, v.z as f64)
}

/// Format a length (stored in meters) for display
pub fn format_length(meters: f64, units: Units, dims: &DimensionSettings) -> String {
    let value = meters * 1000.0 / units.to_mm();
    if dims.show_units {
        format!("{:.*} {}", dims.precision, value, units.abbrev())
    } else {
        format!("{:.*}", dims.precision, value)
    }
}

/// Format an angle in degrees for display
pub fn format_angle(degrees: f64, dims: &DimensionSettings) -> String {
    format!("{:.*}°", dims.precision, degrees)
}
