//! Instanced batches: one shared unit mesh drawn many times with per-instance
//! transform and color.

use glam::Mat4;
use serde::Serialize;

use crate::viewport::mesh::MeshData;
use crate::viewport::picking::Aabb;

/// Part category of a fence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FencePart {
    Post,
    Rail,
    Slat,
}

impl FencePart {
    pub fn label(&self) -> &'static str {
        match self {
            FencePart::Post => "post",
            FencePart::Rail => "rail",
            FencePart::Slat => "slat",
        }
    }
}

/// Shared geometry a batch instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitShape {
    /// 1x1x1 box centered at the origin
    Box,
    /// Diameter 1, height 1 cylinder along Y centered at the origin
    Cylinder,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub matrix: Mat4,
    pub color: [f32; 3],
}

/// One draw call worth of identical geometry
#[derive(Debug, Clone)]
pub struct InstancedBatch {
    pub part: FencePart,
    pub shape: UnitShape,
    pub mesh: MeshData,
    pub instances: Vec<Instance>,
}

impl InstancedBatch {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Local-space bounds of all instances
    pub fn bounds(&self) -> Aabb {
        let unit = Aabb::from_mesh(&self.mesh);
        self.instances
            .iter()
            .fold(Aabb::EMPTY, |acc, inst| acc.union(&unit.transformed(&inst.matrix)))
    }
}
