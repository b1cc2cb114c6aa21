//! Procedural geometry for floors and fences.

mod fence_builder;
mod floor_builder;
pub mod instancing;

pub use fence_builder::{build_fence, slats_per_module, FenceBuildOptions, FenceGeometry};
pub use floor_builder::{build_floor, clean_polygon, material_color, remap_uv, signed_area};
pub use instancing::{FencePart, Instance, InstancedBatch, UnitShape};

use kurbo::{BezPath, Point, Shape};
use shared::Point2;

/// Errors from geometry builders
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("need at least {required} points, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    #[error("unknown fence preset '{0}'")]
    UnknownPreset(String),

    #[error("triangulation failed: {0}")]
    Triangulation(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

fn polyline(points: &[Point2], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(Point::new(first.x, first.z));
        for p in iter {
            path.line_to(Point::new(p.x, p.z));
        }
        if closed {
            path.close_path();
        }
    }
    path
}

/// Running length of a fence polyline
pub fn fence_length(points: &[Point2]) -> f64 {
    polyline(points, false).perimeter(1e-9)
}

/// Enclosed area of a floor polygon, independent of winding
pub fn floor_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    polyline(points, true).area().abs()
}
