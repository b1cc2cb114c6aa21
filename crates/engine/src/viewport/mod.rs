//! Headless viewport pieces: CPU meshes, ray picking and the translation gizmo.

pub mod gizmo;
pub mod mesh;
pub mod picking;

pub use gizmo::{DragHandle, GizmoAxis, Manipulator};
pub use mesh::{LineMeshData, MeshData};
pub use picking::{Aabb, Ray};
