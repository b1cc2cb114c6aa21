//! Pointer-driven interaction: the mode state machine, object and vertex
//! picking, drafting new Floors/Fences, measuring and manipulator drags.

mod draft;
mod measure;
mod revert;
mod tools;

pub use draft::DraftShape;
pub use measure::MeasureTool;
pub use revert::RevertAnimation;
pub use tools::{EditingTools, VertexMarkers};

use serde::{Deserialize, Serialize};
use shared::{
    FenceConfig, FloorSurface, Item, ItemId, ItemKind, ItemType, Point2, PresetLibrary, Transform,
};

use crate::build::{fence_length, floor_area};
use crate::collision::SafetyZoneDetector;
use crate::helpers::{point_to_world, transform_position, vec3_to_point};
use crate::state::settings::EngineSettings;
use crate::state::store::ItemStore;
use crate::sync::SceneGraph;
use crate::vertex_edit::{self, VertexReadout};
use crate::viewport::gizmo::{DragHandle, Manipulator};
use crate::viewport::picking::{ray_ground, ray_point_distance, Ray};

/// Interaction mode
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Idle,
    DrawingFloor,
    DrawingFence,
    /// Next primary click places a catalog model
    PlacingItem {
        asset: String,
        #[serde(default)]
        price: f64,
    },
    Editing,
    Measuring,
    /// Catalog browsing, owned by the UI; pointer input is ignored
    Catalog,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::DrawingFloor => "drawing_floor",
            Mode::DrawingFence => "drawing_fence",
            Mode::PlacingItem { .. } => "placing_item",
            Mode::Editing => "editing",
            Mode::Measuring => "measuring",
            Mode::Catalog => "catalog",
        }
    }
}

/// Pointer input already converted to world rays
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Click; `extend` is the multi-select modifier
    Primary { ray: Ray, extend: bool },
    Secondary { ray: Ray },
    DragStart { ray: Ray },
    DragMove { ray: Ray },
    DragEnd,
}

/// Everything an input event may read or write
pub struct InteractionEnv<'a, S: ItemStore> {
    pub store: &'a mut S,
    pub scene: &'a mut SceneGraph,
    pub settings: &'a EngineSettings,
    pub presets: &'a PresetLibrary,
    pub detector: &'a SafetyZoneDetector,
}

/// Visible effect of an input event
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    None,
    DraftPoint(usize),
    Created(ItemId),
    Selected(ItemId),
    Deselected,
    VertexPicked(Vec<usize>),
    Measured(f64),
    DragStarted(ItemId),
    Dragged,
    Committed(ItemId),
    Reverted(ItemId),
}

#[derive(Debug)]
pub struct InteractionManager {
    mode: Mode,
    pub tools: EditingTools,
    draft: Option<DraftShape>,
    measure: MeasureTool,
}

impl InteractionManager {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            mode: Mode::Idle,
            tools: EditingTools::new(Manipulator::new(
                settings.interaction.gizmo_axis_length,
                settings.interaction.gizmo_pick_threshold,
            )),
            draft: None,
            measure: MeasureTool::default(),
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.tools.selected()
    }

    pub fn draft(&self) -> Option<&DraftShape> {
        self.draft.as_ref()
    }

    pub fn measure(&self) -> &MeasureTool {
        &self.measure
    }

    /// Switch mode from the UI. Entering `Editing` requires a selection;
    /// every other mode drops it. Returns false when the switch is refused.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if mode == Mode::Editing && self.tools.selected().is_none() {
            return false;
        }
        self.draft = match mode {
            Mode::DrawingFloor => Some(DraftShape::new(ItemType::Floor)),
            Mode::DrawingFence => Some(DraftShape::new(ItemType::Fence)),
            _ => None,
        };
        self.measure.reset();
        if mode != Mode::Editing {
            self.tools.deselect();
        }
        self.enter(mode);
        true
    }

    fn enter(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!("Mode {} -> {}", self.mode.label(), mode.label());
            self.mode = mode;
        }
    }

    /// Select an item by id (UI list selection)
    pub fn select_item(&mut self, id: &str, scene: &SceneGraph) -> bool {
        let Some(obj) = scene.get(id) else {
            return false;
        };
        self.tools.select(obj.id.clone(), obj.item_type());
        self.draft = None;
        self.measure.reset();
        self.enter(Mode::Editing);
        true
    }

    pub fn deselect(&mut self) {
        self.tools.deselect();
        if self.mode == Mode::Editing {
            self.enter(Mode::Idle);
        }
    }

    pub fn handle<S: ItemStore>(
        &mut self,
        event: &PointerEvent,
        env: &mut InteractionEnv<'_, S>,
        now: f64,
    ) -> InteractionOutcome {
        match (&self.mode, event) {
            (Mode::Catalog, _) => InteractionOutcome::None,
            (Mode::DrawingFloor | Mode::DrawingFence, PointerEvent::Primary { ray, .. }) => {
                self.add_draft_point(ray, env.settings)
            }
            (Mode::DrawingFloor | Mode::DrawingFence, PointerEvent::Secondary { .. }) => {
                self.finalize_draft(env)
            }
            (Mode::PlacingItem { asset, price }, PointerEvent::Primary { ray, .. }) => {
                let (asset, price) = (asset.clone(), *price);
                self.place_item(ray, asset, price, env)
            }
            (Mode::Measuring, PointerEvent::Primary { ray, .. }) => {
                let Some(hit) = ray_ground(ray, 0.0) else {
                    return InteractionOutcome::None;
                };
                self.measure.click(vec3_to_point(hit));
                match self.measure.length() {
                    Some(length) => InteractionOutcome::Measured(length),
                    None => InteractionOutcome::None,
                }
            }
            (Mode::Measuring, PointerEvent::Secondary { .. }) => {
                self.measure.reset();
                InteractionOutcome::None
            }
            (Mode::Idle | Mode::Editing, PointerEvent::Primary { ray, extend }) => {
                self.pick(ray, *extend, env)
            }
            (Mode::Editing, PointerEvent::Secondary { .. }) => {
                self.deselect();
                InteractionOutcome::Deselected
            }
            (Mode::Idle | Mode::Editing, PointerEvent::DragStart { ray }) => {
                self.begin_drag(ray, env.scene, &*env.store)
            }
            (_, PointerEvent::DragMove { ray }) => self.drag_move(ray, env.scene),
            (_, PointerEvent::DragEnd) => self.end_drag(env, now),
            _ => InteractionOutcome::None,
        }
    }

    fn add_draft_point(&mut self, ray: &Ray, settings: &EngineSettings) -> InteractionOutcome {
        let (Some(draft), Some(hit)) = (self.draft.as_mut(), ray_ground(ray, 0.0)) else {
            return InteractionOutcome::None;
        };
        if draft.push(
            vec3_to_point(hit),
            settings.interaction.min_draft_point_distance,
        ) {
            InteractionOutcome::DraftPoint(draft.len())
        } else {
            InteractionOutcome::None
        }
    }

    /// Turn the draft into a new item. Below the minimum point count the
    /// draft and the drawing mode are kept.
    fn finalize_draft<S: ItemStore>(&mut self, env: &mut InteractionEnv<'_, S>) -> InteractionOutcome {
        let Some(draft) = self.draft.as_mut() else {
            return InteractionOutcome::None;
        };
        let kind = draft.kind;
        let Some(points) = draft.take_if_complete() else {
            tracing::debug!(
                "{} draft has {} of {} points, not finalized",
                kind.label(),
                draft.len(),
                draft.min_points()
            );
            return InteractionOutcome::None;
        };

        let item = new_shape_item(kind, points, env.settings, env.presets);
        let id = item.id.clone();
        if let Err(e) = env.store.add_item_undoable(item) {
            tracing::warn!("Could not create {}: {}", kind.label(), e);
            return InteractionOutcome::None;
        }
        tracing::info!("Created {} '{}'", kind.label(), id);
        self.draft = None;
        self.enter(Mode::Idle);
        InteractionOutcome::Created(id)
    }

    fn place_item<S: ItemStore>(
        &mut self,
        ray: &Ray,
        asset: String,
        price: f64,
        env: &mut InteractionEnv<'_, S>,
    ) -> InteractionOutcome {
        let Some(hit) = ray_ground(ray, 0.0) else {
            return InteractionOutcome::None;
        };
        let item = Item {
            id: uuid::Uuid::new_v4().to_string(),
            transform: Transform::at([hit.x as f64, 0.0, hit.z as f64]),
            price,
            kind: ItemKind::Model { asset },
        };
        let id = item.id.clone();
        if let Err(e) = env.store.add_item_undoable(item) {
            tracing::warn!("Could not place model: {}", e);
            return InteractionOutcome::None;
        }
        tracing::info!("Placed model '{}'", id);
        self.tools.select(id.clone(), ItemType::Model);
        self.enter(Mode::Editing);
        InteractionOutcome::Created(id)
    }

    /// Primary click in idle/editing: vertex markers first, then objects,
    /// then empty space.
    fn pick<S: ItemStore>(
        &mut self,
        ray: &Ray,
        extend: bool,
        env: &mut InteractionEnv<'_, S>,
    ) -> InteractionOutcome {
        if let Some(index) = self.pick_marker(ray, env.scene, env.settings) {
            if let Some(markers) = self.tools.markers_mut() {
                markers.selection.pick(index, extend);
                return InteractionOutcome::VertexPicked(markers.selection.indices().to_vec());
            }
        }

        match env.scene.pick(ray) {
            Some(id) => {
                let kind = env.scene.get(&id).map(|o| o.item_type());
                if let Some(kind) = kind {
                    self.tools.select(id.clone(), kind);
                    self.enter(Mode::Editing);
                }
                InteractionOutcome::Selected(id)
            }
            None => {
                self.deselect();
                self.enter(Mode::Idle);
                InteractionOutcome::Deselected
            }
        }
    }

    /// Index of the closest marker of the selected Floor/Fence within the pick radius
    fn pick_marker(&self, ray: &Ray, scene: &SceneGraph, settings: &EngineSettings) -> Option<usize> {
        let markers = self.tools.markers()?;
        let obj = scene.get(&markers.item_id)?;
        let radius = settings.interaction.marker_pick_radius;
        obj.shadow
            .points()?
            .iter()
            .enumerate()
            .map(|(i, p)| (i, ray_point_distance(ray, point_to_world(p, &obj.transform))))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn begin_drag<S: ItemStore>(&mut self, ray: &Ray, scene: &SceneGraph, store: &S) -> InteractionOutcome {
        let Some(id) = self.tools.selected().map(str::to_string) else {
            return InteractionOutcome::None;
        };
        let Some(obj) = scene.get(&id) else {
            return InteractionOutcome::None;
        };
        // A new drag supersedes a running revert
        self.tools.cancel_revert();

        let handle = match self
            .tools
            .manipulator
            .hit_test(ray, transform_position(&obj.transform))
        {
            Some(axis) => DragHandle::Axis(axis),
            None if scene.pick(ray).as_deref() == Some(id.as_str()) => DragHandle::Ground,
            None => return InteractionOutcome::None,
        };

        // The live transform may still be mid-revert
        let start = store
            .get_item(&id)
            .map(|item| item.transform)
            .unwrap_or_else(|| obj.transform.clone());
        if self.tools.manipulator.begin_drag(ray, handle, &start) {
            tracing::debug!("Drag started on '{}' ({:?})", id, handle);
            InteractionOutcome::DragStarted(id)
        } else {
            InteractionOutcome::None
        }
    }

    fn drag_move(&mut self, ray: &Ray, scene: &mut SceneGraph) -> InteractionOutcome {
        let Some(transform) = self.tools.manipulator.drag_to(ray) else {
            return InteractionOutcome::None;
        };
        let Some(obj) = self
            .tools
            .manipulator
            .attached()
            .and_then(|id| scene.get_mut(id))
        else {
            return InteractionOutcome::None;
        };
        obj.transform = transform;
        InteractionOutcome::Dragged
    }

    /// Commit the drag, or start a revert when the moved item now overlaps
    /// another item's safety zone.
    fn end_drag<S: ItemStore>(&mut self, env: &mut InteractionEnv<'_, S>, now: f64) -> InteractionOutcome {
        let Some(id) = self.tools.manipulator.attached().map(str::to_string) else {
            return InteractionOutcome::None;
        };
        let Some(start) = self.tools.manipulator.end_drag() else {
            return InteractionOutcome::None;
        };
        let Some(current) = env.scene.get(&id).map(|o| o.transform.clone()) else {
            return InteractionOutcome::None;
        };
        if current == start {
            return InteractionOutcome::None;
        }

        if env.detector.collides(env.scene, &id) {
            tracing::info!("Drag of '{}' collides with a safety zone, reverting", id);
            self.tools.start_revert(RevertAnimation::new(
                id.clone(),
                current,
                start,
                now,
                env.settings.revert.duration,
            ));
            return InteractionOutcome::Reverted(id);
        }

        match env.store.update_transform_undoable(&id, current) {
            Ok(()) => {
                tracing::debug!("Committed drag of '{}'", id);
                InteractionOutcome::Committed(id)
            }
            Err(e) => {
                tracing::warn!("Could not commit drag: {}", e);
                InteractionOutcome::None
            }
        }
    }

    /// Advance the revert animation. Returns the id it moved, if any.
    pub fn sample_revert(&mut self, scene: &mut SceneGraph, now: f64) -> Option<ItemId> {
        let anim = self.tools.revert()?.clone();
        if let Some(obj) = scene.get_mut(&anim.item_id) {
            obj.transform = anim.sample(now);
        }
        if anim.is_finished(now) {
            self.tools.cancel_revert();
        }
        Some(anim.item_id)
    }

    /// Post-synchronization bookkeeping: leave editing when the selection
    /// was detached, drop vertex indices past the end of the point list.
    pub fn after_sync(&mut self, scene: &SceneGraph) {
        if self.mode == Mode::Editing && self.tools.selected().is_none() {
            self.enter(Mode::Idle);
        }
        let Some(markers) = self.tools.markers_mut() else {
            return;
        };
        if let Some(count) = scene
            .get(&markers.item_id)
            .and_then(|o| o.shadow.points())
            .map(|p| p.len())
        {
            markers.selection.retain_valid(count);
        }
    }

    // ── Vertex constraint entry points ───────────────────────

    /// Pick a control point of the selected Floor/Fence by index
    pub fn select_vertex<S: ItemStore>(&mut self, store: &S, index: usize, extend: bool) -> bool {
        let Some(markers) = self.tools.markers_mut() else {
            return false;
        };
        let count = store
            .get_item(&markers.item_id)
            .and_then(|item| item.points().map(<[Point2]>::len))
            .unwrap_or(0);
        if index >= count {
            return false;
        }
        markers.selection.pick(index, extend);
        true
    }

    pub fn swap_selection(&mut self) -> bool {
        self.tools
            .markers_mut()
            .is_some_and(|m| m.selection.swap())
    }

    pub fn vertex_readout<S: ItemStore>(&self, store: &S) -> Option<VertexReadout> {
        let markers = self.tools.markers()?;
        let item = store.get_item(&markers.item_id)?;
        Some(vertex_edit::readout(item.points()?, &markers.selection))
    }

    /// Set the reference-pivot distance by moving the pivot
    pub fn apply_distance<S: ItemStore>(&mut self, store: &mut S, length: f64) -> bool {
        self.edit_points(store, |points, selection| {
            let Some((anchor, movable)) = selection.distance_pair() else {
                return false;
            };
            vertex_edit::apply_distance(points, movable, anchor, length)
        })
    }

    pub fn apply_angle<S: ItemStore>(&mut self, store: &mut S, degrees: f64) -> bool {
        self.edit_points(store, |points, selection| {
            vertex_edit::apply_angle(points, selection, degrees)
        })
    }

    fn edit_points<S, F>(&mut self, store: &mut S, edit: F) -> bool
    where
        S: ItemStore,
        F: FnOnce(&mut [Point2], &crate::state::VertexSelection) -> bool,
    {
        let Some(markers) = self.tools.markers() else {
            return false;
        };
        let Some(mut points) = store
            .get_item(&markers.item_id)
            .and_then(|item| item.points().map(<[Point2]>::to_vec))
        else {
            return false;
        };
        if !edit(&mut points, &markers.selection) {
            return false;
        }
        let id = markers.item_id.clone();
        match store.update_points_undoable(&id, points) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Vertex edit on '{}' rejected: {}", id, e);
                false
            }
        }
    }
}

/// New Floor/Fence item from drafted points, priced from its size
fn new_shape_item(
    kind: ItemType,
    points: Vec<Point2>,
    settings: &EngineSettings,
    presets: &PresetLibrary,
) -> Item {
    let (price, kind) = match kind {
        ItemType::Fence => {
            let preset_id = settings.fence.default_preset.clone();
            let per_meter = presets
                .get(&preset_id)
                .map(|p| p.price_per_meter)
                .unwrap_or(0.0);
            (
                fence_length(&points) * per_meter,
                ItemKind::Fence {
                    points,
                    config: FenceConfig::new(preset_id),
                },
            )
        }
        _ => (
            floor_area(&points) * settings.floor.price_per_square_meter,
            ItemKind::Floor {
                points,
                surface: FloorSurface::Material {
                    material: settings.floor.default_material.clone(),
                },
            },
        ),
    };
    Item {
        id: uuid::Uuid::new_v4().to_string(),
        transform: Transform::new(),
        price,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::state::store::MemoryItemStore;
    use crate::sync::{AssetLoader, NoTools, SceneSynchronizer, SyncContext};
    use std::sync::Arc;

    struct World {
        store: MemoryItemStore,
        scene: SceneGraph,
        settings: EngineSettings,
        presets: PresetLibrary,
        detector: SafetyZoneDetector,
        assets: AssetLoader,
        manager: InteractionManager,
    }

    impl World {
        fn new(store: MemoryItemStore) -> Self {
            let settings = EngineSettings::default();
            let mut world = Self {
                store,
                scene: SceneGraph::new(),
                manager: InteractionManager::new(&settings),
                settings,
                presets: PresetLibrary::builtin(),
                detector: SafetyZoneDetector::default(),
                assets: AssetLoader::new(Arc::new(fixtures::asset_provider())),
            };
            world.sync();
            world
        }

        fn sync(&mut self) {
            let mut ctx = SyncContext {
                presets: &self.presets,
                settings: &self.settings,
                assets: &mut self.assets,
            };
            SceneSynchronizer::new().synchronize(
                &self.store.items(),
                &mut self.scene,
                &mut ctx,
                &mut NoTools,
            );
        }

        fn send(&mut self, event: PointerEvent) -> InteractionOutcome {
            let mut env = InteractionEnv {
                store: &mut self.store,
                scene: &mut self.scene,
                settings: &self.settings,
                presets: &self.presets,
                detector: &self.detector,
            };
            self.manager.handle(&event, &mut env, 0.0)
        }

        fn click(&mut self, x: f32, z: f32) -> InteractionOutcome {
            self.send(PointerEvent::Primary {
                ray: Ray::down_at(x, z),
                extend: false,
            })
        }
    }

    #[test]
    fn test_draw_fence_and_finalize() {
        let mut w = World::new(MemoryItemStore::new());
        assert!(w.manager.set_mode(Mode::DrawingFence));
        assert_eq!(w.click(0.0, 0.0), InteractionOutcome::DraftPoint(1));
        // Too close to the previous point
        assert_eq!(w.click(0.01, 0.0), InteractionOutcome::None);
        assert_eq!(w.click(4.0, 0.0), InteractionOutcome::DraftPoint(2));

        let outcome = w.send(PointerEvent::Secondary {
            ray: Ray::down_at(4.0, 0.0),
        });
        let InteractionOutcome::Created(id) = outcome else {
            panic!("Expected Created, got {outcome:?}");
        };
        assert_eq!(w.manager.mode(), &Mode::Idle);
        let item = w.store.get_item(&id).unwrap();
        assert_eq!(item.points().unwrap().len(), 2);
        // 4 m of the default picket preset
        assert!((item.price - 4.0 * 42.0).abs() < 1e-6);
    }

    #[test]
    fn test_finalize_below_minimum_keeps_drawing() {
        let mut w = World::new(MemoryItemStore::new());
        w.manager.set_mode(Mode::DrawingFloor);
        w.click(0.0, 0.0);
        w.click(2.0, 0.0);
        let outcome = w.send(PointerEvent::Secondary {
            ray: Ray::down_at(0.0, 0.0),
        });
        assert_eq!(outcome, InteractionOutcome::None);
        assert_eq!(w.manager.mode(), &Mode::DrawingFloor);
        assert_eq!(w.manager.draft().unwrap().len(), 2);
        assert!(w.store.is_empty());
    }

    #[test]
    fn test_place_item_selects_it() {
        let mut w = World::new(MemoryItemStore::new());
        w.manager.set_mode(Mode::PlacingItem {
            asset: "swing".to_string(),
            price: 250.0,
        });
        let InteractionOutcome::Created(id) = w.click(3.0, -2.0) else {
            panic!("Expected Created");
        };
        assert_eq!(w.manager.mode(), &Mode::Editing);
        assert_eq!(w.manager.selected(), Some(id.as_str()));
        let item = w.store.get_item(&id).unwrap();
        assert_eq!(item.transform.position, [3.0, 0.0, -2.0]);
        assert_eq!(item.price, 250.0);
    }

    #[test]
    fn test_measure_two_clicks() {
        let mut w = World::new(MemoryItemStore::new());
        w.manager.set_mode(Mode::Measuring);
        assert_eq!(w.click(0.0, 0.0), InteractionOutcome::None);
        assert_eq!(w.click(0.0, 2.0), InteractionOutcome::Measured(2.0));
        assert_eq!(w.click(5.0, 5.0), InteractionOutcome::None);
    }

    #[test]
    fn test_click_object_then_empty_space() {
        let mut store = MemoryItemStore::new();
        store.add_item(fixtures::model_item("m", "swing")).unwrap();
        let mut w = World::new(store);

        assert_eq!(w.click(0.0, 0.0), InteractionOutcome::Selected("m".to_string()));
        assert_eq!(w.manager.mode(), &Mode::Editing);
        assert_eq!(w.manager.tools.manipulator.attached(), Some("m"));

        assert_eq!(w.click(30.0, 30.0), InteractionOutcome::Deselected);
        assert_eq!(w.manager.mode(), &Mode::Idle);
        assert!(w.manager.tools.manipulator.attached().is_none());
    }

    #[test]
    fn test_marker_pick_takes_priority() {
        let mut store = MemoryItemStore::new();
        store
            .add_item(fixtures::floor_item(
                "f",
                &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)],
            ))
            .unwrap();
        let mut w = World::new(store);
        assert_eq!(w.click(1.5, 2.5), InteractionOutcome::Selected("f".to_string()));
        assert_eq!(w.click(4.0, 0.1), InteractionOutcome::VertexPicked(vec![1]));
        let outcome = w.send(PointerEvent::Primary {
            ray: Ray::down_at(4.0, 4.0),
            extend: true,
        });
        assert_eq!(outcome, InteractionOutcome::VertexPicked(vec![1, 2]));
        let readout = w.manager.vertex_readout(&w.store).unwrap();
        assert!((readout.distance.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_commit_and_revert() {
        let mut store = MemoryItemStore::new();
        store.add_item(fixtures::model_item("a", "swing")).unwrap();
        let mut b = fixtures::model_item("b", "swing");
        b.transform = Transform::at([6.0, 0.0, 0.0]);
        store.add_item(b).unwrap();
        let mut w = World::new(store);

        // Select b, drag it on the ground to x = 4 (zones still apart)
        w.click(6.0, 0.0);
        assert_eq!(
            w.send(PointerEvent::DragStart { ray: Ray::down_at(6.2, 0.3) }),
            InteractionOutcome::DragStarted("b".to_string())
        );
        w.send(PointerEvent::DragMove { ray: Ray::down_at(4.2, 0.3) });
        assert_eq!(
            w.send(PointerEvent::DragEnd),
            InteractionOutcome::Committed("b".to_string())
        );
        assert!((w.store.get_item("b").unwrap().transform.position[0] - 4.0).abs() < 1e-4);

        // Now drag into a's zone: reverted, store unchanged
        w.send(PointerEvent::DragStart { ray: Ray::down_at(4.2, 0.3) });
        w.send(PointerEvent::DragMove { ray: Ray::down_at(1.2, 0.3) });
        assert_eq!(
            w.send(PointerEvent::DragEnd),
            InteractionOutcome::Reverted("b".to_string())
        );
        assert!((w.store.get_item("b").unwrap().transform.position[0] - 4.0).abs() < 1e-4);
        assert!(w.manager.tools.revert().is_some());

        w.manager.sample_revert(&mut w.scene, 10.0);
        assert!(w.manager.tools.revert().is_none());
        assert!((w.scene.get("b").unwrap().transform.position[0] - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_apply_distance_through_store() {
        let mut store = MemoryItemStore::new();
        store
            .add_item(fixtures::fence_item("x", &[(0.0, 0.0), (3.0, 4.0)], "picket"))
            .unwrap();
        let mut w = World::new(store);
        assert!(w.manager.select_item("x", &w.scene));
        assert!(w.manager.select_vertex(&w.store, 0, false));
        assert!(w.manager.select_vertex(&w.store, 1, true));
        assert!(!w.manager.select_vertex(&w.store, 7, true));

        assert!(w.manager.apply_distance(&mut w.store, 10.0));
        let readout = w.manager.vertex_readout(&w.store).unwrap();
        assert!((readout.distance.unwrap() - 10.0).abs() < 1e-9);
        assert!(w.store.can_undo());

        assert!(!w.manager.apply_distance(&mut w.store, -1.0));
        assert!(!w.manager.apply_angle(&mut w.store, 45.0));
    }

    #[test]
    fn test_editing_requires_selection() {
        let mut w = World::new(MemoryItemStore::new());
        assert!(!w.manager.set_mode(Mode::Editing));
        assert_eq!(w.manager.mode(), &Mode::Idle);
    }
}
