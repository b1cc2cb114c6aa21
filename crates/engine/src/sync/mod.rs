//! Scene synchronization
//!
//! Reconciles the live scene graph with the store's item list: one live object
//! per item id, transform-only updates when the geometry-defining fields are
//! unchanged, destroy-and-rebuild when they changed, and removal of objects
//! whose item disappeared (detaching any tool that still points at them).

pub mod assets;
pub mod scene_graph;

pub use assets::{
    AssetError, AssetLoader, AssetProvider, AssetState, DirectoryAssetProvider,
    InMemoryAssetProvider, ModelAsset, SafetyZoneDef,
};
pub use scene_graph::{LiveGeometry, LiveObject, SceneGraph, Shadow, WorldZone};

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use shared::{Item, ItemId, ItemKind, PresetLibrary};

use crate::build::{build_fence, build_floor, BuildError, FenceBuildOptions};
use crate::state::settings::EngineSettings;

/// Editing tools that may hold references to live objects
pub trait ToolRefs {
    /// True when a tool (manipulator, vertex markers) points at `id`
    fn references(&self, id: &str) -> bool;

    /// Drop every tool reference to `id`
    fn detach(&mut self, id: &str);

    /// True while a tool drives this object's transform (drag or revert)
    fn overrides_transform(&self, id: &str) -> bool;
}

/// No tools attached; used by headless passes
pub struct NoTools;

impl ToolRefs for NoTools {
    fn references(&self, _id: &str) -> bool {
        false
    }

    fn detach(&mut self, _id: &str) {}

    fn overrides_transform(&self, _id: &str) -> bool {
        false
    }
}

/// Read-only inputs of a synchronization pass
pub struct SyncContext<'a> {
    pub presets: &'a PresetLibrary,
    pub settings: &'a EngineSettings,
    pub assets: &'a mut AssetLoader,
}

/// What a synchronization pass did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub created: Vec<ItemId>,
    /// Transform-only updates
    pub updated: Vec<ItemId>,
    /// Destroyed and rebuilt because geometry fields changed
    pub rebuilt: Vec<ItemId>,
    pub removed: Vec<ItemId>,
    /// Waiting for an asset load
    pub pending: Vec<ItemId>,
    /// Items left without a live object, with the reason
    pub skipped: Vec<(ItemId, String)>,
    /// Ids whose tools were detached during removal
    pub detached: Vec<ItemId>,
}

impl SyncReport {
    /// True when no live object was created, rebuilt or destroyed
    pub fn is_structurally_unchanged(&self) -> bool {
        self.created.is_empty() && self.rebuilt.is_empty() && self.removed.is_empty()
    }
}

enum BuildOutcome {
    Built(LiveObject),
    Pending,
    Skipped(String),
}

/// Reconciler over the scene graph and asset cache. Its own state is the
/// pass counter and the skips already logged.
#[derive(Debug, Default)]
pub struct SceneSynchronizer {
    passes: u64,
    /// Last logged skip reason per item
    logged_skips: HashMap<ItemId, String>,
}

impl SceneSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed passes
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Items currently skipped whose reason has been logged
    pub fn logged_skip_count(&self) -> usize {
        self.logged_skips.len()
    }

    /// Warn once per item and reason; repeats of the same skip go to debug
    fn log_skip(&mut self, id: &str, reason: &str) {
        if self.logged_skips.get(id).map(String::as_str) == Some(reason) {
            tracing::debug!("Still skipping item '{}': {}", id, reason);
            return;
        }
        tracing::warn!("Skipping item '{}': {}", id, reason);
        self.logged_skips.insert(id.to_string(), reason.to_string());
    }

    pub fn synchronize(
        &mut self,
        items: &[Item],
        scene: &mut SceneGraph,
        ctx: &mut SyncContext<'_>,
        tools: &mut dyn ToolRefs,
    ) -> SyncReport {
        ctx.assets.poll();

        let mut report = SyncReport::default();
        let mut index: BTreeSet<ItemId> = scene.ids().into_iter().collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());

        for item in items {
            if !seen.insert(item.id.as_str()) {
                tracing::warn!("Duplicate item id '{}' ignored", item.id);
                report
                    .skipped
                    .push((item.id.clone(), "duplicate item id".to_string()));
                continue;
            }
            index.remove(&item.id);

            let changed = match scene.get_mut(&item.id) {
                Some(obj) if obj.shadow == Shadow::of(item) => {
                    if obj.transform != item.transform && !tools.overrides_transform(&item.id) {
                        obj.transform = item.transform.clone();
                        report.updated.push(item.id.clone());
                    }
                    continue;
                }
                Some(_) => true,
                None => false,
            };

            if changed {
                // Rebuild from scratch; the old object never survives a content change
                scene.remove(&item.id);
            }

            match build_live_object(item, ctx) {
                BuildOutcome::Built(obj) => {
                    self.logged_skips.remove(&item.id);
                    tracing::debug!(
                        "{} {} '{}'",
                        if changed { "Rebuilt" } else { "Created" },
                        item.item_type().label(),
                        item.id
                    );
                    scene.insert(obj);
                    if changed {
                        report.rebuilt.push(item.id.clone());
                    } else {
                        report.created.push(item.id.clone());
                    }
                }
                BuildOutcome::Pending => {
                    if changed {
                        self.detach_tools(&item.id, tools, &mut report);
                    }
                    report.pending.push(item.id.clone());
                }
                BuildOutcome::Skipped(reason) => {
                    self.log_skip(&item.id, &reason);
                    if changed {
                        self.detach_tools(&item.id, tools, &mut report);
                    }
                    report.skipped.push((item.id.clone(), reason));
                }
            }
        }

        self.logged_skips.retain(|id, _| seen.contains(id.as_str()));

        // Anything left has no source item
        for id in index {
            self.detach_tools(&id, tools, &mut report);
            scene.remove(&id);
            tracing::debug!("Removed orphaned live object '{}'", id);
            report.removed.push(id);
        }

        self.passes += 1;
        report
    }

    fn detach_tools(&self, id: &str, tools: &mut dyn ToolRefs, report: &mut SyncReport) {
        if tools.references(id) {
            tools.detach(id);
            report.detached.push(id.to_string());
        }
    }
}

fn build_live_object(item: &Item, ctx: &mut SyncContext<'_>) -> BuildOutcome {
    match &item.kind {
        ItemKind::Model { asset } => match ctx.assets.request(asset) {
            AssetState::Ready(model) => {
                BuildOutcome::Built(LiveObject::new(item, LiveGeometry::Model(model), None))
            }
            AssetState::Pending => BuildOutcome::Pending,
            AssetState::Failed(err) => BuildOutcome::Skipped(err.to_string()),
        },
        ItemKind::Floor { points, surface } => {
            match build_floor(points, surface, ctx.settings.floor.thickness) {
                Ok(mesh) => BuildOutcome::Built(LiveObject::new(item, LiveGeometry::Floor(mesh), None)),
                Err(err) => BuildOutcome::Skipped(err.to_string()),
            }
        }
        ItemKind::Fence { points, config } => {
            let Some(preset) = ctx.presets.get(&config.preset_id) else {
                return BuildOutcome::Skipped(
                    BuildError::UnknownPreset(config.preset_id.clone()).to_string(),
                );
            };
            let options = FenceBuildOptions {
                module_length: ctx.settings.fence.module_length,
                rail_inset: ctx.settings.fence.rail_inset,
            };
            match build_fence(points, config, preset, &options) {
                Ok(fence) => BuildOutcome::Built(LiveObject::new(
                    item,
                    LiveGeometry::Fence(fence),
                    Some(preset.clone()),
                )),
                Err(err) => BuildOutcome::Skipped(err.to_string()),
            }
        }
    }
}
