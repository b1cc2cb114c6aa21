//! Floor slabs: a planar polygon triangulated and extruded to a fixed thickness.

use glam::Vec3;
use shared::{FloorSurface, Point2, MIN_FLOOR_POINTS};

use super::BuildError;
use crate::viewport::mesh::{push_vert, MeshData};

const DUPLICATE_EPS: f64 = 1e-9;
const TEXTURED_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Flat colors of the built-in floor materials
const MATERIALS: &[(&str, [f32; 3])] = &[
    ("concrete", [0.62, 0.62, 0.6]),
    ("grass", [0.33, 0.55, 0.24]),
    ("wood", [0.55, 0.38, 0.22]),
    ("gravel", [0.7, 0.66, 0.58]),
    ("tile", [0.78, 0.5, 0.38]),
    ("rubber", [0.2, 0.45, 0.65]),
];

/// Color of a named floor material. Unknown names fall back to the first entry.
pub fn material_color(name: &str) -> [f32; 3] {
    MATERIALS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .unwrap_or(MATERIALS[0].1)
}

pub fn is_known_material(name: &str) -> bool {
    MATERIALS.iter().any(|(n, _)| *n == name)
}

/// Polygon with consecutive and closing duplicates removed
pub fn clean_polygon(points: &[Point2]) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| last.distance(p) > DUPLICATE_EPS) {
            out.push(*p);
        }
    }
    while out.len() > 1 && out[0].distance(&out[out.len() - 1]) <= DUPLICATE_EPS {
        out.pop();
    }
    out
}

/// Shoelace area in (x, z); positive when counter-clockwise in that plane
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.z - b.x * a.z
        })
        .sum::<f64>()
        * 0.5
}

/// Texture coordinates of a ground point, rotated by `rotation_deg` and
/// repeated every `scale` world units.
pub fn remap_uv(p: &Point2, scale: f64, rotation_deg: f64) -> [f32; 2] {
    let scale = if scale.abs() > f64::EPSILON { scale } else { 1.0 };
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    [
        ((p.x * cos - p.z * sin) / scale) as f32,
        ((p.x * sin + p.z * cos) / scale) as f32,
    ]
}

/// Extrude a floor polygon into a closed slab between y = 0 and y = `thickness`.
///
/// The top face is triangulated with ear clipping so concave outlines are
/// handled. A textured surface renders white and carries UVs on every vertex;
/// a material surface gets its palette color and no UVs.
pub fn build_floor(
    points: &[Point2],
    surface: &FloorSurface,
    thickness: f64,
) -> Result<MeshData, BuildError> {
    let outline = clean_polygon(points);
    if outline.len() < MIN_FLOOR_POINTS {
        return Err(BuildError::TooFewPoints {
            required: MIN_FLOOR_POINTS,
            actual: outline.len(),
        });
    }
    let area = signed_area(&outline);
    if area.abs() < DUPLICATE_EPS {
        return Err(BuildError::Triangulation(
            "floor outline has no area".to_string(),
        ));
    }

    let flat: Vec<f64> = outline.iter().flat_map(|p| [p.x, p.z]).collect();
    let triangles = earcutr::earcut(&flat, &[], 2)
        .map_err(|e| BuildError::Triangulation(format!("{e:?}")))?;
    if triangles.is_empty() {
        return Err(BuildError::Triangulation(
            "ear clipping produced no triangles".to_string(),
        ));
    }

    // (scale, rotation) of a textured surface
    let (color, texture) = match surface {
        FloorSurface::Material { material } => {
            if !is_known_material(material) {
                tracing::debug!("Unknown floor material '{material}', using default");
            }
            (material_color(material), None)
        }
        FloorSurface::Texture {
            scale, rotation, ..
        } => (TEXTURED_COLOR, Some((*scale, *rotation))),
    };

    let top_y = thickness.max(0.0) as f32;
    let mut mesh = MeshData::default();
    let push = |mesh: &mut MeshData, p: &Point2, y: f32, n: Vec3| -> u32 {
        let idx = mesh.vertex_count() as u32;
        push_vert(&mut mesh.vertices, p.x as f32, y, p.z as f32, n, color);
        if let Some((scale, rotation)) = texture {
            mesh.uvs.extend_from_slice(&remap_uv(p, scale, rotation));
        }
        idx
    };

    // Top and bottom caps
    let top_base = mesh.vertex_count() as u32;
    for p in &outline {
        push(&mut mesh, p, top_y, Vec3::Y);
    }
    let bottom_base = mesh.vertex_count() as u32;
    for p in &outline {
        push(&mut mesh, p, 0.0, Vec3::NEG_Y);
    }
    let mut bottom = Vec::with_capacity(triangles.len());
    for tri in triangles.chunks_exact(3) {
        let (a, mut b, mut c) = (tri[0] as u32, tri[1] as u32, tri[2] as u32);
        // (x, z)-plane counter-clockwise triangles face -Y; flip them for the top
        if cross_xz(&outline[tri[0]], &outline[tri[1]], &outline[tri[2]]) > 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        mesh.indices
            .extend_from_slice(&[top_base + a, top_base + b, top_base + c]);
        bottom.extend_from_slice(&[bottom_base + a, bottom_base + c, bottom_base + b]);
    }
    mesh.indices.extend(bottom);

    // Side walls
    let ccw = area > 0.0;
    let n = outline.len();
    for i in 0..n {
        let p0 = &outline[i];
        let p1 = &outline[(i + 1) % n];
        let (ex, ez) = ((p1.x - p0.x) as f32, (p1.z - p0.z) as f32);
        let normal = if ccw {
            Vec3::new(ez, 0.0, -ex)
        } else {
            Vec3::new(-ez, 0.0, ex)
        }
        .normalize_or_zero();

        let b0 = push(&mut mesh, p0, 0.0, normal);
        let b1 = push(&mut mesh, p1, 0.0, normal);
        let t1 = push(&mut mesh, p1, top_y, normal);
        let t0 = push(&mut mesh, p0, top_y, normal);
        if ccw {
            mesh.indices.extend_from_slice(&[b0, t1, b1, b0, t0, t1]);
        } else {
            mesh.indices.extend_from_slice(&[b0, b1, t1, b0, t1, t0]);
        }
    }

    Ok(mesh)
}

fn cross_xz(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.z - a.z) - (b.z - a.z) * (c.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MeshValidator;

    fn square(size: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    fn l_shape() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 4.0),
            Point2::new(0.0, 4.0),
        ]
    }

    fn face_normal(mesh: &MeshData, tri: usize) -> Vec3 {
        let i = &mesh.indices[tri * 3..tri * 3 + 3];
        let (a, b, c) = (
            mesh.position(i[0] as usize),
            mesh.position(i[1] as usize),
            mesh.position(i[2] as usize),
        );
        (b - a).cross(c - a)
    }

    #[test]
    fn test_square_slab() {
        let mesh = build_floor(&square(2.0), &FloorSurface::default(), 0.05).unwrap();
        // 2 top + 2 bottom + 4 sides * 2
        assert_eq!(mesh.triangle_count(), 12);
        assert!(!mesh.has_uvs());
        assert!(MeshValidator::new(&mesh).validate_all().is_empty());
    }

    #[test]
    fn test_top_faces_up_either_winding() {
        let mut reversed = square(1.0);
        reversed.reverse();
        for pts in [square(1.0), reversed] {
            let mesh = build_floor(&pts, &FloorSurface::default(), 0.1).unwrap();
            // Top cap triangles come first, then the bottom cap
            assert!(face_normal(&mesh, 0).y > 0.0);
            assert!(face_normal(&mesh, 1).y > 0.0);
            assert!(face_normal(&mesh, 2).y < 0.0);
            assert!(face_normal(&mesh, 3).y < 0.0);
        }
    }

    #[test]
    fn test_side_walls_face_outward() {
        let mut reversed = square(2.0);
        reversed.reverse();
        for pts in [square(2.0), reversed] {
            let mesh = build_floor(&pts, &FloorSurface::default(), 0.1).unwrap();
            let center = Vec3::new(1.0, 0.05, 1.0);
            for tri in 4..mesh.triangle_count() {
                let i = mesh.indices[tri * 3] as usize;
                let to_face = mesh.position(i) - center;
                assert!(face_normal(&mesh, tri).dot(to_face) > 0.0);
            }
        }
    }

    #[test]
    fn test_concave_polygon() {
        let mesh = build_floor(&l_shape(), &FloorSurface::default(), 0.05).unwrap();
        // 4 top + 4 bottom + 6 sides * 2
        assert_eq!(mesh.triangle_count(), 20);
        assert!(MeshValidator::new(&mesh).validate_all().is_empty());
    }

    #[test]
    fn test_duplicates_removed() {
        let mut pts = square(1.0);
        pts.insert(1, Point2::new(0.0, 0.0));
        pts.push(Point2::new(0.0, 0.0));
        assert_eq!(clean_polygon(&pts).len(), 4);
    }

    #[test]
    fn test_too_few_points_after_cleaning() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
        ];
        let err = build_floor(&pts, &FloorSurface::default(), 0.05).unwrap_err();
        assert!(matches!(err, BuildError::TooFewPoints { required: 3, actual: 2 }));
    }

    #[test]
    fn test_collinear_rejected() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(matches!(
            build_floor(&pts, &FloorSurface::default(), 0.05),
            Err(BuildError::Triangulation(_))
        ));
    }

    #[test]
    fn test_texture_surface_has_uvs() {
        let surface = FloorSurface::Texture {
            texture: "pavers".to_string(),
            scale: 0.5,
            rotation: 0.0,
        };
        let mesh = build_floor(&square(1.0), &surface, 0.05).unwrap();
        assert_eq!(mesh.uvs.len(), mesh.vertex_count() * 2);
        // Vertex 2 of the top cap is (1, 1); scale 0.5 doubles the repeat
        assert_eq!(&mesh.uvs[4..6], &[2.0, 2.0]);
    }

    #[test]
    fn test_remap_uv_rotation() {
        let uv = remap_uv(&Point2::new(1.0, 0.0), 1.0, 90.0);
        assert!(uv[0].abs() < 1e-6);
        assert!((uv[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_material_fallback() {
        assert_eq!(material_color("grass"), [0.33, 0.55, 0.24]);
        assert_eq!(material_color("lava"), material_color("concrete"));
    }

    #[test]
    fn test_signed_area() {
        assert!((signed_area(&square(2.0)) - 4.0).abs() < 1e-9);
        let mut cw = square(2.0);
        cw.reverse();
        assert!((signed_area(&cw) + 4.0).abs() < 1e-9);
    }
}
