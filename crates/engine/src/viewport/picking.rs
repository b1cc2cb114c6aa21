use glam::{Mat4, Vec3};

use super::mesh::MeshData;

/// A ray in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Straight-down ray hitting the ground at (x, z)
    pub fn down_at(x: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, 50.0, z), Vec3::NEG_Y)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Inverted box that any `include` call replaces
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Compute AABB from MeshData (9 floats per vertex: pos+normal+color)
    pub fn from_mesh(data: &MeshData) -> Self {
        let mut aabb = Self::EMPTY;
        for i in 0..data.vertex_count() {
            aabb.include(data.position(i));
        }
        aabb
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing this box after an affine transform
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        if !self.is_valid() {
            return *self;
        }
        let mut out = Self::EMPTY;
        for c in self.corners() {
            out.include(m.transform_point3(c));
        }
        out
    }

    /// Strict overlap test; boxes that only touch do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    if !aabb.is_valid() {
        return None;
    }

    let inv_dir = Vec3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Distance to the nearest triangle of `mesh` placed in the world by
/// `matrix`. Triangles with out-of-range indices are ignored.
pub fn ray_mesh(ray: &Ray, mesh: &MeshData, matrix: &Mat4) -> Option<f32> {
    let count = mesh.vertex_count();
    mesh.indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < count))
        .filter_map(|tri| {
            let [v0, v1, v2] =
                [tri[0], tri[1], tri[2]].map(|i| matrix.transform_point3(mesh.position(i as usize)));
            ray_triangle_intersect(ray, v0, v1, v2)
        })
        .min_by(f32::total_cmp)
}

/// Intersect the ray with the horizontal plane `y = height`.
/// Returns None if the ray is parallel to the plane or the hit is behind the origin.
pub fn ray_ground(ray: &Ray, height: f32) -> Option<Vec3> {
    let denom = ray.direction.y;
    if denom.abs() < 1e-6 {
        return None;
    }

    let t = (height - ray.origin.y) / denom;
    if t < 0.0 {
        return None;
    }

    Some(ray.at(t))
}

/// Perpendicular distance from a point to the ray (points behind the origin
/// measure to the origin).
pub fn ray_point_distance(ray: &Ray, point: Vec3) -> f32 {
    let t = (point - ray.origin).dot(ray.direction).max(0.0);
    (ray.at(t) - point).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(center: Vec3) -> Aabb {
        Aabb::new(center - Vec3::splat(0.5), center + Vec3::splat(0.5))
    }

    #[test]
    fn test_ray_hits_box() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let dist = ray_aabb(&ray, &unit_box_at(Vec3::ZERO)).unwrap();
        assert!((dist - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_ray_misses_box() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z);
        assert!(ray_aabb(&ray, &unit_box_at(Vec3::ZERO)).is_none());
    }

    #[test]
    fn test_ray_triangle_hit_and_miss() {
        let (v0, v1, v2) = (
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let t = ray_triangle_intersect(&Ray::down_at(0.0, 0.0), v0, v1, v2).unwrap();
        assert!((t - 50.0).abs() < 1e-4);
        assert!(ray_triangle_intersect(&Ray::down_at(0.9, 0.9), v0, v1, v2).is_none());

        // Behind the origin
        let up = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(ray_triangle_intersect(&up, v0, v1, v2).is_none());
    }

    #[test]
    fn test_ray_mesh_uses_placement() {
        let mesh = crate::viewport::mesh::cube(1.0, 1.0, 1.0, [1.0; 3]);
        let at = Mat4::from_translation(Vec3::new(4.0, 0.5, 0.0));

        let t = ray_mesh(&Ray::down_at(4.2, 0.3), &mesh, &at).unwrap();
        assert!((t - 49.0).abs() < 1e-4);
        assert!(ray_mesh(&Ray::down_at(0.0, 0.0), &mesh, &at).is_none());
    }

    #[test]
    fn test_ray_mesh_skips_bad_indices() {
        let mut mesh = crate::viewport::mesh::cube(1.0, 1.0, 1.0, [1.0; 3]);
        mesh.indices.extend([0, 1, 999]);
        assert!(ray_mesh(&Ray::down_at(0.0, 0.0), &mesh, &Mat4::IDENTITY).is_some());
    }

    #[test]
    fn test_ray_ground() {
        let hit = ray_ground(&Ray::down_at(2.0, -3.0), 0.0).unwrap();
        assert!((hit - Vec3::new(2.0, 0.0, -3.0)).length() < 1e-4);

        let up = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(ray_ground(&up, 0.0).is_none());
    }

    #[test]
    fn test_intersects_strict() {
        let a = unit_box_at(Vec3::ZERO);
        let b = unit_box_at(Vec3::new(0.9, 0.0, 0.0));
        let touching = unit_box_at(Vec3::new(1.0, 0.0, 0.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&touching));
        assert!(!a.intersects(&Aabb::EMPTY));
    }

    #[test]
    fn test_transformed_rotation_grows_box() {
        let a = Aabb::new(Vec3::new(-1.0, 0.0, -0.1), Vec3::new(1.0, 1.0, 0.1));
        let rotated = a.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!((rotated.size().x - 0.2).abs() < 1e-4);
        assert!((rotated.size().z - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_point_distance() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!((ray_point_distance(&ray, Vec3::new(5.0, 2.0, 0.0)) - 2.0).abs() < 1e-5);
        assert!((ray_point_distance(&ray, Vec3::new(-3.0, 0.0, 4.0)) - 5.0).abs() < 1e-5);
    }
}
