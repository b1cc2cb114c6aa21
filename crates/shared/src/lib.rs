use serde::{Deserialize, Serialize};

pub mod presets;

pub use presets::{FencePreset, PostShape, PresetLibrary, RailShape, SlatLayout};

/// Stable, globally unique identifier of a placed item
pub type ItemId = String;

/// Minimum number of points for a floor polygon
pub const MIN_FLOOR_POINTS: usize = 3;

/// Minimum number of points for a fence polyline
pub const MIN_FENCE_POINTS: usize = 2;

/// Planar point on the ground plane (x, z)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point2 {
    pub x: f64,
    pub z: f64,
}

impl Point2 {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.z - other.z)
    }
}

/// Object transform. Rotation is XYZ Euler angles in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Identity transform translated to `position`
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Floor appearance: either a flat palette material or a remapped texture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FloorSurface {
    Material {
        material: String,
    },
    Texture {
        texture: String,
        /// World units covered by one texture repeat
        #[serde(default = "default_texture_scale")]
        scale: f64,
        /// Pattern rotation in degrees
        #[serde(default)]
        rotation: f64,
    },
}

fn default_texture_scale() -> f64 {
    1.0
}

impl Default for FloorSurface {
    fn default() -> Self {
        FloorSurface::Material {
            material: "concrete".to_string(),
        }
    }
}

/// Per-fence configuration: which preset, and how to color it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceConfig {
    pub preset_id: String,
    #[serde(default)]
    pub colors: FenceColors,
}

impl FenceConfig {
    pub fn new(preset_id: impl Into<String>) -> Self {
        Self {
            preset_id: preset_id.into(),
            colors: FenceColors::default(),
        }
    }
}

/// Color map of a fence: one post color and up to three slat colors (RGB 0..1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceColors {
    pub post: [f32; 3],
    pub slats: Vec<[f32; 3]>,
}

impl FenceColors {
    pub const MAX_SLAT_COLORS: usize = 3;

    /// Slat palette clamped to the supported size, never empty
    pub fn slat_palette(&self) -> Vec<[f32; 3]> {
        let mut palette: Vec<[f32; 3]> = self
            .slats
            .iter()
            .take(Self::MAX_SLAT_COLORS)
            .copied()
            .collect();
        if palette.is_empty() {
            palette.push(self.post);
        }
        palette
    }
}

impl Default for FenceColors {
    fn default() -> Self {
        Self {
            post: [0.35, 0.35, 0.38],
            slats: vec![[0.55, 0.42, 0.3]],
        }
    }
}

/// Type-specific payload of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// A catalog model loaded from an asset reference
    Model { asset: String },
    /// Extruded floor polygon
    Floor {
        points: Vec<Point2>,
        #[serde(default)]
        surface: FloorSurface,
    },
    /// Fence along a polyline
    Fence {
        points: Vec<Point2>,
        config: FenceConfig,
    },
}

/// Discriminant of [`ItemKind`] without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Model,
    Floor,
    Fence,
}

impl ItemType {
    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Model => "Model",
            ItemType::Floor => "Floor",
            ItemType::Fence => "Fence",
        }
    }
}

/// A declarative record describing one placed design element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub price: f64,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    pub fn item_type(&self) -> ItemType {
        match self.kind {
            ItemKind::Model { .. } => ItemType::Model,
            ItemKind::Floor { .. } => ItemType::Floor,
            ItemKind::Fence { .. } => ItemType::Fence,
        }
    }

    /// Control points for floors and fences
    pub fn points(&self) -> Option<&[Point2]> {
        match &self.kind {
            ItemKind::Floor { points, .. } | ItemKind::Fence { points, .. } => Some(points),
            ItemKind::Model { .. } => None,
        }
    }

    pub fn points_mut(&mut self) -> Option<&mut Vec<Point2>> {
        match &mut self.kind {
            ItemKind::Floor { points, .. } | ItemKind::Fence { points, .. } => Some(points),
            ItemKind::Model { .. } => None,
        }
    }

    /// Minimum control point count for this kind (0 for models)
    pub fn min_points(&self) -> usize {
        match self.kind {
            ItemKind::Model { .. } => 0,
            ItemKind::Floor { .. } => MIN_FLOOR_POINTS,
            ItemKind::Fence { .. } => MIN_FENCE_POINTS,
        }
    }

    /// Check the point-count invariant. Returns the offending count on failure.
    pub fn check_points(&self) -> Result<(), usize> {
        match self.points() {
            Some(points) if points.len() < self.min_points() => Err(points.len()),
            _ => Ok(()),
        }
    }
}

fn default_version() -> u32 {
    1
}

/// Serialized list of items (the canonical scene)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub items: Vec<Item>,
}
