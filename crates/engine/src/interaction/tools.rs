//! Editing tools bound to the selected item: manipulator, vertex markers and
//! the pending drag revert.

use shared::{ItemId, ItemType};

use super::revert::RevertAnimation;
use crate::state::VertexSelection;
use crate::sync::ToolRefs;
use crate::viewport::gizmo::Manipulator;

/// Control point markers shown on the selected Floor/Fence
#[derive(Debug, Clone, Default)]
pub struct VertexMarkers {
    pub item_id: ItemId,
    pub selection: VertexSelection,
}

#[derive(Debug, Clone, Default)]
pub struct EditingTools {
    selected: Option<ItemId>,
    pub manipulator: Manipulator,
    markers: Option<VertexMarkers>,
    revert: Option<RevertAnimation>,
}

impl EditingTools {
    pub fn new(manipulator: Manipulator) -> Self {
        Self {
            manipulator,
            ..Default::default()
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn markers(&self) -> Option<&VertexMarkers> {
        self.markers.as_ref()
    }

    pub fn markers_mut(&mut self) -> Option<&mut VertexMarkers> {
        self.markers.as_mut()
    }

    pub fn vertex_selection(&self) -> Option<&VertexSelection> {
        self.markers.as_ref().map(|m| &m.selection)
    }

    pub fn revert(&self) -> Option<&RevertAnimation> {
        self.revert.as_ref()
    }

    /// Select an item, attaching the manipulator and, for Floor/Fence, the
    /// vertex markers. A different item starts with an empty vertex selection.
    pub fn select(&mut self, id: ItemId, kind: ItemType) {
        self.cancel_revert();
        if self.selected.as_deref() == Some(id.as_str()) {
            return;
        }
        self.manipulator.attach(id.clone());
        self.markers = match kind {
            ItemType::Floor | ItemType::Fence => Some(VertexMarkers {
                item_id: id.clone(),
                selection: VertexSelection::new(),
            }),
            ItemType::Model => None,
        };
        self.selected = Some(id);
    }

    pub fn deselect(&mut self) {
        self.cancel_revert();
        self.selected = None;
        self.markers = None;
        self.manipulator.detach();
    }

    pub fn start_revert(&mut self, animation: RevertAnimation) {
        self.revert = Some(animation);
    }

    /// Drop the pending revert. The live object snaps to the store transform
    /// on the next synchronization pass.
    pub fn cancel_revert(&mut self) -> Option<RevertAnimation> {
        self.revert.take()
    }
}

impl ToolRefs for EditingTools {
    fn references(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
            || self.manipulator.attached() == Some(id)
            || self.markers.as_ref().is_some_and(|m| m.item_id == id)
            || self.revert.as_ref().is_some_and(|r| r.item_id == id)
    }

    fn detach(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.manipulator.attached() == Some(id) {
            self.manipulator.detach();
        }
        if self.markers.as_ref().is_some_and(|m| m.item_id == id) {
            self.markers = None;
        }
        if self.revert.as_ref().is_some_and(|r| r.item_id == id) {
            self.revert = None;
        }
        tracing::debug!("Detached editing tools from '{}'", id);
    }

    fn overrides_transform(&self, id: &str) -> bool {
        (self.manipulator.is_dragging() && self.manipulator.attached() == Some(id))
            || self.revert.as_ref().is_some_and(|r| r.item_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Transform;

    #[test]
    fn test_select_floor_shows_markers() {
        let mut tools = EditingTools::default();
        tools.select("f".to_string(), ItemType::Floor);
        assert_eq!(tools.selected(), Some("f"));
        assert_eq!(tools.manipulator.attached(), Some("f"));
        assert!(tools.markers().is_some());

        tools.select("m".to_string(), ItemType::Model);
        assert!(tools.markers().is_none());
    }

    #[test]
    fn test_new_item_clears_vertex_selection() {
        let mut tools = EditingTools::default();
        tools.select("a".to_string(), ItemType::Fence);
        tools.markers_mut().unwrap().selection.pick(1, false);
        tools.select("a".to_string(), ItemType::Fence);
        assert_eq!(tools.vertex_selection().unwrap().len(), 1);
        tools.select("b".to_string(), ItemType::Fence);
        assert!(tools.vertex_selection().unwrap().is_empty());
    }

    #[test]
    fn test_detach_clears_everything() {
        let mut tools = EditingTools::default();
        tools.select("a".to_string(), ItemType::Floor);
        tools.start_revert(RevertAnimation::new(
            "a".to_string(),
            Transform::new(),
            Transform::new(),
            0.0,
            1.0,
        ));
        assert!(tools.overrides_transform("a"));
        tools.detach("a");
        assert!(!tools.references("a"));
        assert!(tools.selected().is_none());
        assert!(tools.manipulator.attached().is_none());
    }

    #[test]
    fn test_reselect_cancels_revert() {
        let mut tools = EditingTools::default();
        tools.select("a".to_string(), ItemType::Model);
        tools.start_revert(RevertAnimation::new(
            "a".to_string(),
            Transform::new(),
            Transform::new(),
            0.0,
            1.0,
        ));
        tools.select("a".to_string(), ItemType::Model);
        assert!(tools.revert().is_none());
    }
}
