//! Headless test harness: an engine over the in-memory store and an
//! in-memory asset catalog, with a fixed-step clock and ground-plane
//! pointer helpers.

use std::sync::Arc;

use shared::{Item, PresetLibrary, SceneDocument};

use crate::engine::{Engine, Frame};
use crate::interaction::{InteractionOutcome, Mode, PointerEvent};
use crate::state::settings::EngineSettings;
use crate::state::store::{ItemStore, MemoryItemStore, StoreError};
use crate::sync::{AssetLoader, InMemoryAssetProvider, LiveGeometry};
use crate::validation::MeshValidator;
use crate::viewport::picking::Ray;

/// Seconds per harness tick
pub const TICK: f64 = 1.0 / 60.0;

pub struct TestHarness {
    pub engine: Engine<MemoryItemStore>,
    now: f64,
    last_frame: Frame,
}

impl TestHarness {
    /// Empty scene with the playground asset catalog
    pub fn new() -> Self {
        Self::with_assets(crate::fixtures::asset_provider())
    }

    pub fn with_assets(provider: InMemoryAssetProvider) -> Self {
        Self::with_settings(provider, EngineSettings::default())
    }

    pub fn with_settings(provider: InMemoryAssetProvider, settings: EngineSettings) -> Self {
        Self {
            engine: Engine::new(
                MemoryItemStore::new(),
                settings,
                PresetLibrary::builtin(),
                AssetLoader::new(Arc::new(provider)),
            ),
            now: 0.0,
            last_frame: Frame::default(),
        }
    }

    // ── Scene manipulation ────────────────────────────────────

    /// Add an item as an undoable step
    pub fn add_item(&mut self, item: Item) -> Result<(), StoreError> {
        self.engine.store_mut().add_item_undoable(item)
    }

    /// Replace the scene. Returns the number of items loaded.
    pub fn load_scene(&mut self, document: SceneDocument) -> usize {
        self.engine.deselect();
        self.engine.store_mut().load_document(document)
    }

    pub fn load_scene_json(&mut self, json: &str) -> Result<usize, String> {
        let document: SceneDocument =
            serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;
        Ok(self.load_scene(document))
    }

    /// The store's document as JSON
    pub fn export_scene_json(&self) -> String {
        serde_json::to_string_pretty(self.engine.store().document()).unwrap_or_default()
    }

    pub fn item_count(&self) -> usize {
        self.engine.store().len()
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        self.engine.store().get_item(id)
    }

    // ── Clock ─────────────────────────────────────────────────

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Run one tick and advance the clock by `TICK`
    pub fn tick(&mut self) -> &Frame {
        self.last_frame = self.engine.tick(self.now);
        self.now += TICK;
        &self.last_frame
    }

    /// Run ticks until `seconds` of clock time have passed
    pub fn run_for(&mut self, seconds: f64) -> &Frame {
        let end = self.now + seconds;
        while self.now < end {
            self.tick();
        }
        &self.last_frame
    }

    pub fn last_frame(&self) -> &Frame {
        &self.last_frame
    }

    // ── Pointer helpers (straight-down rays) ──────────────────

    fn send(&mut self, event: PointerEvent) -> Option<InteractionOutcome> {
        self.engine.push_input(event);
        self.tick();
        self.last_frame.input.last().cloned()
    }

    pub fn click(&mut self, x: f32, z: f32) -> Option<InteractionOutcome> {
        self.send(PointerEvent::Primary {
            ray: Ray::down_at(x, z),
            extend: false,
        })
    }

    pub fn shift_click(&mut self, x: f32, z: f32) -> Option<InteractionOutcome> {
        self.send(PointerEvent::Primary {
            ray: Ray::down_at(x, z),
            extend: true,
        })
    }

    pub fn right_click(&mut self, x: f32, z: f32) -> Option<InteractionOutcome> {
        self.send(PointerEvent::Secondary {
            ray: Ray::down_at(x, z),
        })
    }

    /// Press at `from`, move to `to`, release; one tick per step
    pub fn drag(&mut self, from: (f32, f32), to: (f32, f32)) -> Option<InteractionOutcome> {
        self.send(PointerEvent::DragStart {
            ray: Ray::down_at(from.0, from.1),
        });
        self.send(PointerEvent::DragMove {
            ray: Ray::down_at(to.0, to.1),
        });
        self.send(PointerEvent::DragEnd)
    }

    /// Enter a drawing mode, click every point, finalize
    pub fn draw(&mut self, mode: Mode, points: &[(f32, f32)]) -> Option<InteractionOutcome> {
        if !self.engine.set_mode(mode) {
            return None;
        }
        for &(x, z) in points {
            self.click(x, z);
        }
        let (x, z) = points.last().copied().unwrap_or_default();
        self.right_click(x, z)
    }

    // ── Inspection ────────────────────────────────────────────

    /// Mesh problems per live object (models and floors)
    pub fn validate_meshes(&self) -> Vec<(String, Vec<String>)> {
        self.engine
            .scene()
            .iter()
            .filter_map(|obj| {
                let issues = match &obj.geometry {
                    LiveGeometry::Model(model) => MeshValidator::new(&model.mesh).validate_all(),
                    LiveGeometry::Floor(mesh) => MeshValidator::new(mesh).validate_all(),
                    LiveGeometry::Fence(fence) => fence
                        .batches
                        .iter()
                        .flat_map(|b| MeshValidator::new(&b.mesh).validate_all())
                        .collect(),
                };
                (!issues.is_empty()).then(|| (obj.id.clone(), issues))
            })
            .collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_new_harness_empty() {
        let mut h = TestHarness::new();
        assert_eq!(h.item_count(), 0);
        assert!(h.tick().draws.is_empty());
    }

    #[test]
    fn test_playground_meshes_valid() {
        let mut h = TestHarness::new();
        assert_eq!(h.load_scene(fixtures::playground_store().document().clone()), 5);
        h.tick();
        assert_eq!(h.engine.scene().len(), 5);
        assert!(h.validate_meshes().is_empty(), "{:?}", h.validate_meshes());
    }

    #[test]
    fn test_draw_floor_via_clicks() {
        let mut h = TestHarness::new();
        let outcome = h.draw(Mode::DrawingFloor, &[(0.0, 0.0), (3.0, 0.0), (3.0, 2.0)]);
        assert!(matches!(outcome, Some(InteractionOutcome::Created(_))));
        assert_eq!(h.item_count(), 1);
        h.tick();
        assert_eq!(h.engine.scene().len(), 1);
    }

    #[test]
    fn test_export_json_roundtrip() {
        let mut h = TestHarness::new();
        h.add_item(fixtures::model_item("m", "bench")).unwrap();
        let json = h.export_scene_json();

        let mut other = TestHarness::new();
        assert_eq!(other.load_scene_json(&json), Ok(1));
        assert_eq!(other.item("m"), h.item("m"));
    }
}
