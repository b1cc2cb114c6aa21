//! Read-only traversal of the live scene for document and model exporters.
//!
//! Exporters see one node per item with its type, source points and resolved
//! fence configuration. Nothing here touches the store or the editing tools.

use serde::Serialize;
use shared::{FenceConfig, FencePreset, FloorSurface, ItemId, ItemType, Point2, Transform};

use crate::sync::{LiveGeometry, SceneGraph, Shadow};

/// Instanced part counts of a fence node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FenceCounts {
    pub modules: usize,
    pub posts: usize,
    pub rails: usize,
    pub slats: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportNode {
    pub id: ItemId,
    pub kind: ItemType,
    pub transform: Transform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<FloorSurface>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fence_config: Option<FenceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fence_preset: Option<FencePreset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fence_counts: Option<FenceCounts>,
    /// Triangle count of the built mesh (models and floors)
    pub triangles: usize,
    /// World-space bounds
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// One node per live object, in id order
pub fn export_nodes(scene: &SceneGraph) -> Vec<ExportNode> {
    scene
        .iter()
        .map(|obj| {
            let bounds = obj.world_bounds();
            let mut node = ExportNode {
                id: obj.id.clone(),
                kind: obj.item_type(),
                transform: obj.transform.clone(),
                asset: None,
                points: obj.shadow.points().map(<[Point2]>::to_vec).unwrap_or_default(),
                surface: None,
                fence_config: None,
                fence_preset: obj.fence_preset.clone(),
                fence_counts: None,
                triangles: 0,
                min: bounds.min.to_array(),
                max: bounds.max.to_array(),
            };
            match &obj.shadow {
                Shadow::Model { asset } => node.asset = Some(asset.clone()),
                Shadow::Floor { surface, .. } => node.surface = Some(surface.clone()),
                Shadow::Fence { config, .. } => node.fence_config = Some(config.clone()),
            }
            match &obj.geometry {
                LiveGeometry::Model(model) => node.triangles = model.mesh.triangle_count(),
                LiveGeometry::Floor(mesh) => node.triangles = mesh.triangle_count(),
                LiveGeometry::Fence(fence) => {
                    node.fence_counts = Some(FenceCounts {
                        modules: fence.module_count,
                        posts: fence.post_count,
                        rails: fence.rail_count,
                        slats: fence.slat_count,
                    })
                }
            }
            node
        })
        .collect()
}

/// Export nodes as pretty JSON
pub fn export_scene_json(scene: &SceneGraph) -> String {
    serde_json::to_string_pretty(&export_nodes(scene)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::state::settings::EngineSettings;
    use crate::sync::{AssetLoader, NoTools, SceneSynchronizer, SyncContext};
    use shared::PresetLibrary;
    use std::sync::Arc;

    fn playground_scene() -> SceneGraph {
        let presets = PresetLibrary::builtin();
        let settings = EngineSettings::default();
        let mut assets = AssetLoader::new(Arc::new(fixtures::asset_provider()));
        let mut scene = SceneGraph::new();
        let mut ctx = SyncContext {
            presets: &presets,
            settings: &settings,
            assets: &mut assets,
        };
        SceneSynchronizer::new().synchronize(
            &fixtures::playground_items(),
            &mut scene,
            &mut ctx,
            &mut NoTools,
        );
        scene
    }

    #[test]
    fn test_nodes_carry_type_data() {
        let nodes = export_nodes(&playground_scene());
        assert_eq!(nodes.len(), 5);

        let fence = nodes.iter().find(|n| n.id == "fence").unwrap();
        assert_eq!(fence.kind, ItemType::Fence);
        assert_eq!(fence.points.len(), 2);
        assert_eq!(fence.fence_config.as_ref().unwrap().preset_id, "picket");
        assert_eq!(fence.fence_preset.as_ref().unwrap().id, "picket");
        // 10 m at 2 m per module
        assert_eq!(fence.fence_counts.unwrap().modules, 5);
        assert_eq!(fence.fence_counts.unwrap().posts, 6);

        let floor = nodes.iter().find(|n| n.id == "floor").unwrap();
        assert!(floor.surface.is_some());
        assert_eq!(floor.triangles, 12);

        let swing = nodes.iter().find(|n| n.id == "swing").unwrap();
        assert_eq!(swing.asset.as_deref(), Some("swing"));
        assert!(swing.points.is_empty());
        assert!((swing.min[0] + 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let json = export_scene_json(&playground_scene());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let nodes = value.as_array().unwrap();
        let swing = nodes.iter().find(|n| n["id"] == "swing").unwrap();
        assert!(swing.get("points").is_none());
        assert_eq!(swing["kind"], "model");
    }
}
