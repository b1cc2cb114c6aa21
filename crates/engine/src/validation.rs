//! Mesh validation utilities.
//!
//! `MeshValidator` checks built geometry for stride, index range, unit
//! normals, UV coverage, and that triangle winding agrees with the stored
//! vertex normals.

use crate::viewport::mesh::MeshData;
use crate::viewport::picking::Aabb;

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    /// Check that the vertex buffer length is a multiple of 9 (the stride).
    pub fn is_stride_valid(&self) -> bool {
        self.mesh.vertices.len() % 9 == 0
    }

    pub fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.mesh.vertex_count() as u32;
        self.mesh.indices.iter().all(|&i| i < max_idx)
    }

    /// UVs are either absent or present for every vertex
    pub fn are_uvs_complete(&self) -> bool {
        self.mesh.uvs.is_empty() || self.mesh.uvs.len() == self.mesh.vertex_count() * 2
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        (0..self.mesh.vertex_count()).all(|i| {
            let base = i * 9;
            let n = glam::Vec3::from_slice(&self.mesh.vertices[base + 3..base + 6]);
            (n.length() - 1.0).abs() <= epsilon
        })
    }

    /// Indices of triangles whose winding disagrees with their first vertex normal.
    /// Degenerate triangles are reported too.
    pub fn inconsistent_triangles(&self) -> Vec<usize> {
        self.mesh
            .indices
            .chunks_exact(3)
            .enumerate()
            .filter(|(_, tri)| {
                let a = self.mesh.position(tri[0] as usize);
                let b = self.mesh.position(tri[1] as usize);
                let c = self.mesh.position(tri[2] as usize);
                let face = (b - a).cross(c - a);
                let base = tri[0] as usize * 9;
                let n = glam::Vec3::from_slice(&self.mesh.vertices[base + 3..base + 6]);
                face.length_squared() < 1e-12 || face.dot(n) <= 0.0
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_mesh(self.mesh)
    }

    /// Check that the AABB dimensions are approximately equal to `expected`.
    pub fn assert_dimensions_approx(&self, expected: [f32; 3], tolerance: f32) -> bool {
        let size = self.aabb().size();
        (size.x - expected[0]).abs() < tolerance
            && (size.y - expected[1]).abs() < tolerance
            && (size.z - expected[2]).abs() < tolerance
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_stride_valid() {
            errors.push(format!(
                "Vertex buffer length {} is not a multiple of 9",
                self.mesh.vertices.len()
            ));
            return errors;
        }

        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index buffer length {} is not a multiple of 3",
                self.mesh.indices.len()
            ));
        }

        if !self.are_indices_in_range() {
            let max_idx = self.mesh.vertex_count() as u32;
            let out_of_range: Vec<_> = self
                .mesh
                .indices
                .iter()
                .filter(|&&i| i >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
            return errors;
        }

        if !self.are_uvs_complete() {
            errors.push(format!(
                "UV buffer length {} does not match {} vertices",
                self.mesh.uvs.len(),
                self.mesh.vertex_count()
            ));
        }

        if self.mesh.vertex_count() > 0 && !self.are_normals_normalized(0.1) {
            errors.push("Some normals are not unit-length (epsilon=0.1)".to_string());
        }

        let bad = self.inconsistent_triangles();
        if !bad.is_empty() {
            errors.push(format!(
                "{} triangles disagree with their normals: {:?}",
                bad.len(),
                bad.iter().take(5).collect::<Vec<_>>()
            ));
        }

        errors
    }
}
