//! Live scene graph: one renderable node per item id.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Mat4;
use shared::{FenceConfig, FencePreset, FloorSurface, Item, ItemId, ItemKind, ItemType, Point2, Transform};

use super::assets::{ModelAsset, SafetyZoneDef};
use crate::build::FenceGeometry;
use crate::helpers::transform_matrix;
use crate::viewport::mesh::MeshData;
use crate::viewport::picking::{ray_aabb, ray_mesh, Aabb, Ray};

/// Copy of the item fields that determine a live object's geometry.
/// A differing shadow means the object must be rebuilt; an equal one means
/// only the transform may have changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Shadow {
    Model { asset: String },
    Floor { points: Vec<Point2>, surface: FloorSurface },
    Fence { points: Vec<Point2>, config: FenceConfig },
}

impl Shadow {
    pub fn of(item: &Item) -> Self {
        match &item.kind {
            ItemKind::Model { asset } => Shadow::Model {
                asset: asset.clone(),
            },
            ItemKind::Floor { points, surface } => Shadow::Floor {
                points: points.clone(),
                surface: surface.clone(),
            },
            ItemKind::Fence { points, config } => Shadow::Fence {
                points: points.clone(),
                config: config.clone(),
            },
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            Shadow::Model { .. } => ItemType::Model,
            Shadow::Floor { .. } => ItemType::Floor,
            Shadow::Fence { .. } => ItemType::Fence,
        }
    }

    pub fn points(&self) -> Option<&[Point2]> {
        match self {
            Shadow::Floor { points, .. } | Shadow::Fence { points, .. } => Some(points),
            Shadow::Model { .. } => None,
        }
    }
}

/// Built geometry of a live object
#[derive(Debug, Clone)]
pub enum LiveGeometry {
    Model(Arc<ModelAsset>),
    Floor(MeshData),
    Fence(FenceGeometry),
}

impl LiveGeometry {
    pub fn local_bounds(&self) -> Aabb {
        match self {
            LiveGeometry::Model(asset) => Aabb::from_mesh(&asset.mesh),
            LiveGeometry::Floor(mesh) => Aabb::from_mesh(mesh),
            LiveGeometry::Fence(fence) => fence.bounds(),
        }
    }
}

/// Safety zone resolved to world space
#[derive(Debug, Clone, PartialEq)]
pub struct WorldZone {
    pub item_id: ItemId,
    pub index: usize,
    pub name: String,
    pub visible: bool,
    pub bounds: Aabb,
}

/// Renderable node for one item
#[derive(Debug, Clone)]
pub struct LiveObject {
    pub id: ItemId,
    pub transform: Transform,
    pub shadow: Shadow,
    pub geometry: LiveGeometry,
    /// Preset the fence was built from
    pub fence_preset: Option<FencePreset>,
    pub local_bounds: Aabb,
}

impl LiveObject {
    pub fn new(item: &Item, geometry: LiveGeometry, fence_preset: Option<FencePreset>) -> Self {
        let local_bounds = geometry.local_bounds();
        Self {
            id: item.id.clone(),
            transform: item.transform.clone(),
            shadow: Shadow::of(item),
            geometry,
            fence_preset,
            local_bounds,
        }
    }

    pub fn item_type(&self) -> ItemType {
        self.shadow.item_type()
    }

    pub fn world_matrix(&self) -> Mat4 {
        transform_matrix(&self.transform)
    }

    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.world_matrix())
    }

    /// Distance along `ray` to the object's surface. Models and floors are
    /// tested per triangle, fences per instanced part.
    pub fn ray_hit(&self, ray: &Ray) -> Option<f32> {
        ray_aabb(ray, &self.world_bounds())?;
        let world = self.world_matrix();
        match &self.geometry {
            LiveGeometry::Model(asset) => ray_mesh(ray, &asset.mesh, &world),
            LiveGeometry::Floor(mesh) => ray_mesh(ray, mesh, &world),
            LiveGeometry::Fence(fence) => fence
                .batches
                .iter()
                .flat_map(|batch| {
                    let unit = Aabb::from_mesh(&batch.mesh);
                    batch.instances.iter().filter_map(move |inst| {
                        let matrix = world * inst.matrix;
                        ray_aabb(ray, &unit.transformed(&matrix))?;
                        ray_mesh(ray, &batch.mesh, &matrix)
                    })
                })
                .min_by(f32::total_cmp),
        }
    }

    pub fn safety_zones(&self) -> &[SafetyZoneDef] {
        match &self.geometry {
            LiveGeometry::Model(asset) => &asset.safety_zones,
            _ => &[],
        }
    }

    /// Safety zones transformed into world space
    pub fn world_safety_zones(&self) -> Vec<WorldZone> {
        let matrix = self.world_matrix();
        self.safety_zones()
            .iter()
            .enumerate()
            .map(|(index, zone)| WorldZone {
                item_id: self.id.clone(),
                index,
                name: zone.name.clone(),
                visible: zone.visible,
                bounds: zone.bounds().transformed(&matrix),
            })
            .collect()
    }
}

/// Live objects keyed by item id
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: BTreeMap<ItemId, LiveObject>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&LiveObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LiveObject> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn insert(&mut self, object: LiveObject) -> Option<LiveObject> {
        self.objects.insert(object.id.clone(), object)
    }

    pub fn remove(&mut self, id: &str) -> Option<LiveObject> {
        self.objects.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveObject> {
        self.objects.values()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.objects.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Id of the object whose surface the ray hits first
    pub fn pick(&self, ray: &Ray) -> Option<ItemId> {
        self.objects
            .values()
            .filter_map(|obj| obj.ray_hit(ray).map(|t| (obj, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(obj, _)| obj.id.clone())
    }
}
