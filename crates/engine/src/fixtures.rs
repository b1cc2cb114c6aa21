//! Factory functions for test data: items, model assets and a small playground scene.

use shared::*;

use crate::state::store::MemoryItemStore;
use crate::sync::{InMemoryAssetProvider, ModelAsset, SafetyZoneDef};
use crate::viewport::mesh::cube;

// ── Item factories ──────────────────────────────────────────────

fn points(coords: &[(f64, f64)]) -> Vec<Point2> {
    coords.iter().map(|&(x, z)| Point2::new(x, z)).collect()
}

/// Model item at the origin referencing `asset`
pub fn model_item(id: &str, asset: &str) -> Item {
    Item {
        id: id.to_string(),
        transform: Transform::new(),
        price: 0.0,
        kind: ItemKind::Model {
            asset: asset.to_string(),
        },
    }
}

/// Model item at a ground position
pub fn model_item_at(id: &str, asset: &str, x: f64, z: f64) -> Item {
    Item {
        transform: Transform::at([x, 0.0, z]),
        ..model_item(id, asset)
    }
}

/// Floor with the default concrete surface
pub fn floor_item(id: &str, coords: &[(f64, f64)]) -> Item {
    Item {
        id: id.to_string(),
        transform: Transform::new(),
        price: 0.0,
        kind: ItemKind::Floor {
            points: points(coords),
            surface: FloorSurface::default(),
        },
    }
}

/// Fence using a builtin preset and its default colors
pub fn fence_item(id: &str, coords: &[(f64, f64)], preset_id: &str) -> Item {
    Item {
        id: id.to_string(),
        transform: Transform::new(),
        price: 0.0,
        kind: ItemKind::Fence {
            points: points(coords),
            config: FenceConfig::new(preset_id),
        },
    }
}

// ── Asset factories ─────────────────────────────────────────────

/// Box model of `w × h × d` standing on the ground, with one safety zone
/// extending `margin` beyond it on every side except below.
pub fn model_asset(w: f32, h: f32, d: f32, margin: f32) -> ModelAsset {
    let mut mesh = cube(w, h, d, [0.8, 0.3, 0.2]);
    for v in mesh.vertices.chunks_exact_mut(9) {
        v[1] += h * 0.5;
    }
    ModelAsset {
        mesh,
        safety_zones: vec![SafetyZoneDef {
            name: "clearance".to_string(),
            min: [-w * 0.5 - margin, 0.0, -d * 0.5 - margin],
            max: [w * 0.5 + margin, h + margin, d * 0.5 + margin],
            visible: true,
        }],
    }
}

/// Provider holding the playground catalog: swing, slide and bench
pub fn asset_provider() -> InMemoryAssetProvider {
    let mut bench = model_asset(1.6, 0.45, 0.5, 0.0);
    bench.safety_zones.clear();
    InMemoryAssetProvider::new()
        .with("swing", model_asset(1.0, 1.0, 1.0, 0.5))
        .with("slide", model_asset(0.8, 1.5, 3.0, 1.0))
        .with("bench", bench)
}

// ── Scenes ──────────────────────────────────────────────────────

/// Small yard: a slab, a fence along one edge and three catalog models
pub fn playground_items() -> Vec<Item> {
    vec![
        floor_item("floor", &[(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (-5.0, 5.0)]),
        fence_item("fence", &[(-5.0, -6.0), (5.0, -6.0)], "picket"),
        model_item_at("swing", "swing", -2.0, 0.0),
        model_item_at("slide", "slide", 2.5, 0.0),
        model_item_at("bench", "bench", 0.0, 4.0),
    ]
}

pub fn playground_store() -> MemoryItemStore {
    MemoryItemStore::from_document(SceneDocument {
        version: 1,
        items: playground_items(),
    })
}
