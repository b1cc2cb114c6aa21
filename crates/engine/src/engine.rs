//! Engine tick: input, revert animation, synchronization, collision
//! detection and draw-list submission, driven once per frame.

use std::collections::VecDeque;

use serde::Serialize;
use shared::{ItemId, PresetLibrary};

use crate::build::FencePart;
use crate::collision::{CollisionReport, SafetyZoneDetector};
use crate::helpers::{format_angle, format_length};
use crate::interaction::{InteractionEnv, InteractionManager, InteractionOutcome, Mode, PointerEvent};
use crate::state::settings::EngineSettings;
use crate::state::store::ItemStore;
use crate::sync::{AssetLoader, LiveGeometry, SceneGraph, SceneSynchronizer, SyncContext, SyncReport};
use crate::vertex_edit::VertexReadout;

/// What a draw call renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "part", rename_all = "snake_case")]
pub enum DrawPart {
    Model,
    Floor,
    Fence { fence_part: FencePart },
    SafetyZone { zone: usize, tint: [f32; 4] },
    Gizmo,
    VertexMarkers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCall {
    pub item_id: ItemId,
    #[serde(flatten)]
    pub part: DrawPart,
    pub instance_count: usize,
    /// Drawn with the selection highlight
    pub highlighted: bool,
}

/// Result of one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct Frame {
    pub now: f64,
    pub sync: SyncReport,
    pub collisions: CollisionReport,
    pub draws: Vec<DrawCall>,
    /// Outcomes of the input events consumed this tick
    #[serde(skip)]
    pub input: Vec<InteractionOutcome>,
}

impl Frame {
    pub fn draws_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a DrawCall> + 'a {
        self.draws.iter().filter(move |d| d.item_id == id)
    }
}

pub struct Engine<S: ItemStore> {
    store: S,
    settings: EngineSettings,
    presets: PresetLibrary,
    assets: AssetLoader,
    scene: SceneGraph,
    synchronizer: SceneSynchronizer,
    interaction: InteractionManager,
    detector: SafetyZoneDetector,
    input: VecDeque<PointerEvent>,
    ticks: u64,
}

impl<S: ItemStore> Engine<S> {
    pub fn new(store: S, settings: EngineSettings, presets: PresetLibrary, assets: AssetLoader) -> Self {
        Self {
            interaction: InteractionManager::new(&settings),
            detector: SafetyZoneDetector::from_settings(&settings.safety),
            store,
            settings,
            presets,
            assets,
            scene: SceneGraph::new(),
            synchronizer: SceneSynchronizer::new(),
            input: VecDeque::new(),
            ticks: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access; changes show up on the next tick
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    pub fn interaction(&self) -> &InteractionManager {
        &self.interaction
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn set_safety_zones_visible(&mut self, visible: bool) {
        self.detector.visible = visible;
    }

    // ── Frame ─────────────────────────────────────────────────

    /// Queue pointer input for the next tick
    pub fn push_input(&mut self, event: PointerEvent) {
        self.input.push_back(event);
    }

    pub fn tick(&mut self, now: f64) -> Frame {
        let mut outcomes = Vec::with_capacity(self.input.len());
        {
            let mut env = InteractionEnv {
                store: &mut self.store,
                scene: &mut self.scene,
                settings: &self.settings,
                presets: &self.presets,
                detector: &self.detector,
            };
            while let Some(event) = self.input.pop_front() {
                outcomes.push(self.interaction.handle(&event, &mut env, now));
            }
        }

        self.interaction.sample_revert(&mut self.scene, now);

        let items = self.store.items();
        let mut ctx = SyncContext {
            presets: &self.presets,
            settings: &self.settings,
            assets: &mut self.assets,
        };
        let sync = self
            .synchronizer
            .synchronize(&items, &mut self.scene, &mut ctx, &mut self.interaction.tools);
        self.interaction.after_sync(&self.scene);

        let collisions = self.detector.detect(&self.scene);
        if collisions.has_collisions() {
            tracing::debug!("{} safety zone overlap(s)", collisions.pairs.len());
        }
        let draws = self.draw_list(&collisions);

        self.ticks += 1;
        Frame {
            now,
            sync,
            collisions,
            draws,
            input: outcomes,
        }
    }

    fn draw_list(&self, collisions: &CollisionReport) -> Vec<DrawCall> {
        let selected = self.interaction.selected();
        let mut draws = Vec::with_capacity(self.scene.len() + collisions.zones.len() + 2);

        for obj in self.scene.iter() {
            let highlighted = selected == Some(obj.id.as_str());
            let call = |part, instance_count| DrawCall {
                item_id: obj.id.clone(),
                part,
                instance_count,
                highlighted,
            };
            match &obj.geometry {
                LiveGeometry::Model(_) => draws.push(call(DrawPart::Model, 1)),
                LiveGeometry::Floor(_) => draws.push(call(DrawPart::Floor, 1)),
                LiveGeometry::Fence(fence) => draws.extend(fence.batches.iter().map(|b| {
                    call(DrawPart::Fence { fence_part: b.part }, b.len())
                })),
            }
        }

        for zone in &collisions.zones {
            draws.push(DrawCall {
                item_id: zone.zone.item_id.clone(),
                part: DrawPart::SafetyZone {
                    zone: zone.zone.zone,
                    tint: zone.tint,
                },
                instance_count: 1,
                highlighted: zone.colliding,
            });
        }

        let tools = &self.interaction.tools;
        if let Some(id) = tools.manipulator.attached().filter(|id| self.scene.contains(id)) {
            draws.push(DrawCall {
                item_id: id.to_string(),
                part: DrawPart::Gizmo,
                instance_count: 1,
                highlighted: tools.manipulator.is_dragging(),
            });
        }
        if let Some(markers) = tools.markers() {
            let count = self
                .scene
                .get(&markers.item_id)
                .and_then(|o| o.shadow.points())
                .map_or(0, <[_]>::len);
            if count > 0 {
                draws.push(DrawCall {
                    item_id: markers.item_id.clone(),
                    part: DrawPart::VertexMarkers,
                    instance_count: count,
                    highlighted: !markers.selection.is_empty(),
                });
            }
        }

        draws
    }

    // ── UI entry points ───────────────────────────────────────

    pub fn mode(&self) -> &Mode {
        self.interaction.mode()
    }

    pub fn set_mode(&mut self, mode: Mode) -> bool {
        self.interaction.set_mode(mode)
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.interaction.selected()
    }

    /// Select an item that already has a live object
    pub fn select_item(&mut self, id: &str) -> bool {
        self.interaction.select_item(id, &self.scene)
    }

    pub fn deselect(&mut self) {
        self.interaction.deselect();
    }

    pub fn select_vertex(&mut self, index: usize, extend: bool) -> bool {
        self.interaction.select_vertex(&self.store, index, extend)
    }

    pub fn apply_distance(&mut self, length: f64) -> bool {
        self.interaction.apply_distance(&mut self.store, length)
    }

    pub fn apply_angle(&mut self, degrees: f64) -> bool {
        self.interaction.apply_angle(&mut self.store, degrees)
    }

    pub fn swap_selection(&mut self) -> bool {
        self.interaction.swap_selection()
    }

    pub fn vertex_readout(&self) -> Option<VertexReadout> {
        self.interaction.vertex_readout(&self.store)
    }

    /// Vertex readout formatted with the display settings: (distance, angle)
    pub fn formatted_readout(&self) -> Option<(Option<String>, Option<String>)> {
        let readout = self.vertex_readout()?;
        let dims = &self.settings.dimensions;
        Some((
            readout
                .distance
                .map(|d| format_length(d, self.settings.units, dims)),
            readout.angle.map(|a| format_angle(a, dims)),
        ))
    }

    /// Current measure segment length, formatted
    pub fn measurement(&self) -> Option<String> {
        self.interaction
            .measure()
            .length()
            .map(|l| format_length(l, self.settings.units, &self.settings.dimensions))
    }

    /// Remove the selected item. Its live object and tools go on the next tick.
    pub fn delete_selected(&mut self) -> Option<ItemId> {
        let id = self.interaction.selected()?.to_string();
        match self.store.remove_item_undoable(&id) {
            Ok(item) => {
                tracing::info!("Deleted {} '{}'", item.item_type().label(), id);
                self.interaction.deselect();
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Delete failed: {}", e);
                None
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::state::store::MemoryItemStore;
    use crate::viewport::picking::Ray;
    use shared::Transform;
    use std::sync::Arc;

    fn engine(store: MemoryItemStore) -> Engine<MemoryItemStore> {
        Engine::new(
            store,
            EngineSettings::default(),
            PresetLibrary::builtin(),
            AssetLoader::new(Arc::new(fixtures::asset_provider())),
        )
    }

    #[test]
    fn test_first_tick_creates_everything() {
        let mut e = engine(fixtures::playground_store());
        let frame = e.tick(0.0);
        assert_eq!(frame.sync.created.len(), 5);
        assert_eq!(e.scene().len(), 5);
        assert!(!frame.collisions.has_collisions());
        assert_eq!(frame.draws_for("swing").count(), 2);
        // Picket fence: posts, rails and slats
        assert_eq!(frame.draws_for("fence").count(), 3);

        let frame = e.tick(0.016);
        assert!(frame.sync.is_structurally_unchanged());
    }

    #[test]
    fn test_draws_for_runtime_ids() {
        let mut e = engine(fixtures::playground_store());
        let frame = e.tick(0.0);
        for id in e.scene().ids() {
            let per_item: Vec<&DrawCall> = frame.draws_for(&id).collect();
            assert!(!per_item.is_empty(), "no draws for '{id}'");
            assert!(per_item.iter().all(|d| d.item_id == id));
        }
        let missing = String::from("ghost");
        assert_eq!(frame.draws_for(&missing).count(), 0);
    }

    #[test]
    fn test_click_selects_and_draws_tools() {
        let mut e = engine(fixtures::playground_store());
        e.tick(0.0);
        e.push_input(PointerEvent::Primary {
            ray: Ray::down_at(0.0, -6.0),
            extend: false,
        });
        let frame = e.tick(0.1);
        assert_eq!(e.selected_item(), Some("fence"));
        assert_eq!(e.mode(), &Mode::Editing);
        assert!(frame
            .draws_for("fence")
            .any(|d| d.part == DrawPart::Gizmo));
        let markers = frame
            .draws_for("fence")
            .find(|d| d.part == DrawPart::VertexMarkers)
            .unwrap();
        assert_eq!(markers.instance_count, 2);
    }

    #[test]
    fn test_delete_selected_detaches_and_undo_restores() {
        let mut e = engine(fixtures::playground_store());
        e.tick(0.0);
        assert!(e.select_item("swing"));
        assert_eq!(e.delete_selected(), Some("swing".to_string()));
        let frame = e.tick(0.1);
        assert_eq!(frame.sync.removed, vec!["swing".to_string()]);
        assert!(e.selected_item().is_none());
        assert_eq!(e.mode(), &Mode::Idle);

        assert!(e.undo());
        let frame = e.tick(0.2);
        assert_eq!(frame.sync.created, vec!["swing".to_string()]);
    }

    #[test]
    fn test_overlap_flagged_then_cleared() {
        let mut store = MemoryItemStore::new();
        store.add_item(fixtures::model_item_at("a", "swing", 0.0, 0.0)).unwrap();
        store.add_item(fixtures::model_item_at("b", "swing", 1.5, 0.0)).unwrap();
        let mut e = engine(store);
        let frame = e.tick(0.0);
        assert!(frame.collisions.is_flagged("a", "b"));
        let zone = frame
            .draws
            .iter()
            .find(|d| matches!(d.part, DrawPart::SafetyZone { .. }) && d.item_id == "a")
            .unwrap();
        assert!(zone.highlighted);

        e.store_mut()
            .update_transform("b", Transform::at([2.5, 0.0, 0.0]))
            .unwrap();
        let frame = e.tick(0.1);
        assert!(!frame.collisions.has_collisions());
    }

    #[test]
    fn test_hidden_zones_not_drawn() {
        let mut e = engine(fixtures::playground_store());
        e.set_safety_zones_visible(false);
        let frame = e.tick(0.0);
        assert!(!frame
            .draws
            .iter()
            .any(|d| matches!(d.part, DrawPart::SafetyZone { .. })));
    }

    #[test]
    fn test_revert_runs_over_ticks() {
        let mut store = MemoryItemStore::new();
        store.add_item(fixtures::model_item_at("a", "swing", 0.0, 0.0)).unwrap();
        store.add_item(fixtures::model_item_at("b", "swing", 6.0, 0.0)).unwrap();
        let mut e = engine(store);
        e.tick(0.0);

        e.push_input(PointerEvent::Primary {
            ray: Ray::down_at(6.0, 0.0),
            extend: false,
        });
        e.push_input(PointerEvent::DragStart { ray: Ray::down_at(6.2, 0.3) });
        e.push_input(PointerEvent::DragMove { ray: Ray::down_at(1.2, 0.3) });
        e.push_input(PointerEvent::DragEnd);
        let frame = e.tick(1.0);
        assert_eq!(frame.input.last(), Some(&InteractionOutcome::Reverted("b".to_string())));
        // Sampled at its start time the revert still shows the dropped position
        let x = e.scene().get("b").unwrap().transform.position[0];
        assert!((x - 1.0).abs() < 1e-4, "got {x}");

        e.tick(1.15);
        let x = e.scene().get("b").unwrap().transform.position[0];
        assert!((x - 3.5).abs() < 1e-3, "got {x}");

        e.tick(2.0);
        let x = e.scene().get("b").unwrap().transform.position[0];
        assert!((x - 6.0).abs() < 1e-4);
        assert!(e.interaction().tools.revert().is_none());
        assert_eq!(e.store().get_item("b").unwrap().transform.position, [6.0, 0.0, 0.0]);
    }

    #[test]
    fn test_measurement_formatted() {
        let mut e = engine(MemoryItemStore::new());
        e.set_mode(Mode::Measuring);
        e.push_input(PointerEvent::Primary {
            ray: Ray::down_at(0.0, 0.0),
            extend: false,
        });
        e.push_input(PointerEvent::Primary {
            ray: Ray::down_at(3.0, 4.0),
            extend: false,
        });
        e.tick(0.0);
        assert_eq!(e.measurement().as_deref(), Some("5.00 m"));
    }
}
