//! Fence construction: posts, rails and slats placed module by module along a
//! polyline and merged into instanced batches.

use glam::{Mat4, Quat, Vec3};
use shared::{FenceConfig, FencePreset, Point2, PostShape, RailShape, SlatLayout, MIN_FENCE_POINTS};

use super::instancing::{FencePart, Instance, InstancedBatch, UnitShape};
use super::BuildError;
use crate::viewport::mesh::{cube, cylinder, MeshData};
use crate::viewport::picking::Aabb;

/// Segments shorter than this are treated as duplicate points
const MIN_SEGMENT_LENGTH: f64 = 1e-6;
/// Segments needing more modules than this are skipped
pub const MAX_MODULES_PER_SEGMENT: usize = 10_000;
pub const MAX_SLATS_PER_MODULE: usize = 1_000;
const CYLINDER_SEGMENTS: u32 = 12;
const UNIT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Tunables that come from engine settings rather than the preset
#[derive(Debug, Clone, Copy)]
pub struct FenceBuildOptions {
    pub module_length: f64,
    pub rail_inset: f64,
}

impl Default for FenceBuildOptions {
    fn default() -> Self {
        Self {
            module_length: 2.0,
            rail_inset: 0.15,
        }
    }
}

/// Built fence: instanced batches plus placement statistics
#[derive(Debug, Clone)]
pub struct FenceGeometry {
    pub batches: Vec<InstancedBatch>,
    pub module_count: usize,
    pub post_count: usize,
    pub rail_count: usize,
    pub slat_count: usize,
    /// Sum of non-degenerate segment lengths
    pub total_length: f64,
    /// Number of zero-length or oversized segments that were skipped
    pub skipped_segments: usize,
}

impl FenceGeometry {
    pub fn batch(&self, part: FencePart) -> Option<&InstancedBatch> {
        self.batches.iter().find(|b| b.part == part)
    }

    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(InstancedBatch::len).sum()
    }

    pub fn bounds(&self) -> Aabb {
        self.batches
            .iter()
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b.bounds()))
    }
}

/// Collects instances per part before they become batches
struct PartCollector {
    post_shape: UnitShape,
    rail_shape: UnitShape,
    posts: Vec<Instance>,
    rails: Vec<Instance>,
    slats: Vec<Instance>,
}

impl PartCollector {
    fn into_batches(self) -> Vec<InstancedBatch> {
        let mut batches = Vec::with_capacity(3);
        for (part, shape, instances) in [
            (FencePart::Post, self.post_shape, self.posts),
            (FencePart::Rail, self.rail_shape, self.rails),
            (FencePart::Slat, UnitShape::Box, self.slats),
        ] {
            if instances.is_empty() {
                continue;
            }
            batches.push(InstancedBatch {
                part,
                shape,
                mesh: unit_mesh(shape),
                instances,
            });
        }
        batches
    }
}

fn unit_mesh(shape: UnitShape) -> MeshData {
    match shape {
        UnitShape::Box => cube(1.0, 1.0, 1.0, UNIT_COLOR),
        UnitShape::Cylinder => cylinder(0.5, 1.0, CYLINDER_SEGMENTS, UNIT_COLOR),
    }
}

/// Rotation that turns local +X toward the heading `atan2(dz, dx)` on the ground plane
fn heading_rotation(heading: f64) -> Quat {
    Quat::from_rotation_y(-heading as f32)
}

fn placed(center: Vec3, rotation: Quat, size: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(size, rotation, center)
}

/// Build the instanced geometry of a fence along `points`.
///
/// Every non-degenerate segment is split into `ceil(length / module_length)` equal
/// modules. Each module starts with a post and carries optional rails and its
/// slats; a final post closes the polyline at its last point.
pub fn build_fence(
    points: &[Point2],
    config: &FenceConfig,
    preset: &FencePreset,
    options: &FenceBuildOptions,
) -> Result<FenceGeometry, BuildError> {
    if points.len() < MIN_FENCE_POINTS {
        return Err(BuildError::TooFewPoints {
            required: MIN_FENCE_POINTS,
            actual: points.len(),
        });
    }
    if !(options.module_length > 0.0) {
        return Err(BuildError::InvalidParameter(format!(
            "module length must be positive, got {}",
            options.module_length
        )));
    }

    let palette = config.colors.slat_palette();
    let post_color = config.colors.post;
    let pick_color = |counter: usize| {
        if preset.multi_color {
            palette[counter % palette.len()]
        } else {
            palette[0]
        }
    };

    let mut parts = PartCollector {
        post_shape: match preset.post_shape {
            PostShape::Square => UnitShape::Box,
            PostShape::Round => UnitShape::Cylinder,
        },
        rail_shape: match preset.rail {
            Some(RailShape::Round) => UnitShape::Cylinder,
            _ => UnitShape::Box,
        },
        posts: Vec::new(),
        rails: Vec::new(),
        slats: Vec::new(),
    };

    let post_height = preset.post_height as f32;
    let post_size = preset.post_size as f32;
    let post_scale = Vec3::new(post_size, post_height, post_size);
    let slat_height = preset.effective_slat_height() as f32;
    let slat_y = FencePreset::SLAT_CLEARANCE as f32 + slat_height * 0.5;
    let rail_size = preset.rail_size as f32;
    let rail_levels = [
        post_height - options.rail_inset as f32 - rail_size * 0.5,
        options.rail_inset as f32 + rail_size * 0.5,
    ];

    let mut module_count = 0;
    let mut skipped_segments = 0;
    let mut total_length = 0.0;
    let mut last_heading = 0.0;
    let mut rail_counter = 0;
    let mut slat_counter = 0;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dx = b.x - a.x;
        let dz = b.z - a.z;
        let length = dx.hypot(dz);
        if !(length > MIN_SEGMENT_LENGTH) {
            tracing::debug!("Skipping zero-length fence segment at ({}, {})", a.x, a.z);
            skipped_segments += 1;
            continue;
        }

        let module_estimate = (length / options.module_length).ceil();
        if !(module_estimate <= MAX_MODULES_PER_SEGMENT as f64) {
            tracing::warn!(
                "Skipping fence segment of length {} ({} modules, limit {})",
                length,
                module_estimate,
                MAX_MODULES_PER_SEGMENT
            );
            skipped_segments += 1;
            continue;
        }

        let heading = dz.atan2(dx);
        last_heading = heading;
        total_length += length;

        let rotation = heading_rotation(heading);
        let dir = Vec3::new((dx / length) as f32, 0.0, (dz / length) as f32);
        let start = Vec3::new(a.x as f32, 0.0, a.z as f32);

        let modules = module_estimate.max(1.0) as usize;
        let module_len = length / modules as f64;
        let module_len_f = module_len as f32;

        for m in 0..modules {
            let module_start = start + dir * (module_len_f * m as f32);
            let module_mid = module_start + dir * (module_len_f * 0.5);
            module_count += 1;

            parts.posts.push(Instance {
                matrix: placed(
                    module_start + Vec3::Y * (post_height * 0.5),
                    rotation,
                    post_scale,
                ),
                color: post_color,
            });

            if let Some(shape) = preset.rail {
                for y in rail_levels {
                    let center = Vec3::new(module_mid.x, y, module_mid.z);
                    let matrix = match shape {
                        RailShape::Square => placed(
                            center,
                            rotation,
                            Vec3::new(module_len_f, rail_size, rail_size),
                        ),
                        // Cylinder axis is Y; lay it along local X first
                        RailShape::Round => placed(
                            center,
                            rotation * Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2),
                            Vec3::new(rail_size, module_len_f, rail_size),
                        ),
                    };
                    parts.rails.push(Instance {
                        matrix,
                        color: pick_color(rail_counter),
                    });
                    rail_counter += 1;
                }
            }

            let thickness = preset.slat_thickness as f32;
            match preset.layout {
                SlatLayout::SolidPanel => {
                    let span = (module_len_f - post_size).max(module_len_f * 0.5);
                    parts.slats.push(Instance {
                        matrix: placed(
                            Vec3::new(module_mid.x, slat_y, module_mid.z),
                            rotation,
                            Vec3::new(span, slat_height, thickness),
                        ),
                        color: pick_color(slat_counter),
                    });
                    slat_counter += 1;
                }
                layout => {
                    let count = slats_per_module(layout, module_len, preset.slat_width);
                    let spacing = module_len_f / count as f32;
                    for i in 0..count {
                        let along = module_start + dir * (spacing * (i as f32 + 0.5));
                        parts.slats.push(Instance {
                            matrix: placed(
                                Vec3::new(along.x, slat_y, along.z),
                                rotation,
                                Vec3::new(preset.slat_width as f32, slat_height, thickness),
                            ),
                            color: pick_color(slat_counter),
                        });
                        slat_counter += 1;
                    }
                }
            }
        }
    }

    if let Some(last) = points.last() {
        parts.posts.push(Instance {
            matrix: placed(
                Vec3::new(last.x as f32, post_height * 0.5, last.z as f32),
                heading_rotation(last_heading),
                post_scale,
            ),
            color: post_color,
        });
    }

    let post_count = parts.posts.len();
    let rail_count = parts.rails.len();
    let slat_count = parts.slats.len();

    Ok(FenceGeometry {
        batches: parts.into_batches(),
        module_count,
        post_count,
        rail_count,
        slat_count,
        total_length,
        skipped_segments,
    })
}

/// Slat count of one module of true length `module_len`
pub fn slats_per_module(layout: SlatLayout, module_len: f64, slat_width: f64) -> usize {
    let count = match layout {
        SlatLayout::Fixed { count } => count.max(1) as usize,
        SlatLayout::Gap { gap } => {
            let pitch = slat_width + gap.max(0.0);
            if pitch > 0.0 {
                ((module_len / pitch).floor() as usize).max(1)
            } else {
                1
            }
        }
        SlatLayout::SolidPanel => 1,
    };
    count.min(MAX_SLATS_PER_MODULE)
}
