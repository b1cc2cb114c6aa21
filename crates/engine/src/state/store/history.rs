//! Undo/redo functionality

use super::MemoryItemStore;

impl MemoryItemStore {
    /// Undo last change
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(std::mem::replace(&mut self.document, prev));
        self.version += 1;
        true
    }

    /// Redo last undone change
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(std::mem::replace(&mut self.document, next));
        self.version += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures;
    use crate::state::store::{ItemStore, MemoryItemStore, StoreError, UNDO_LIMIT};
    use shared::{Point2, Transform};

    #[test]
    fn test_undo_redo_transform() {
        let mut store = MemoryItemStore::new();
        store.add_item(fixtures::model_item("m", "bench")).unwrap();

        store.snapshot();
        store.update_transform("m", Transform::at([3.0, 0.0, 0.0])).unwrap();
        assert!(store.can_undo());

        assert!(store.undo());
        assert_eq!(store.get_item("m").unwrap().transform.position, [0.0; 3]);
        assert!(store.can_redo());

        assert!(store.redo());
        assert_eq!(store.get_item("m").unwrap().transform.position, [3.0, 0.0, 0.0]);
        assert!(!store.redo());
    }

    #[test]
    fn test_snapshot_clears_redo() {
        let mut store = MemoryItemStore::new();
        store.snapshot();
        store.add_item(fixtures::model_item("m", "bench")).unwrap();
        store.undo();
        assert!(store.can_redo());
        store.snapshot();
        assert!(!store.can_redo());
    }

    #[test]
    fn test_rejected_mutations_keep_history() {
        let mut store = MemoryItemStore::new();
        store.add_item_undoable(fixtures::model_item("a", "bench")).unwrap();
        store
            .add_item_undoable(fixtures::fence_item("x", &[(0.0, 0.0), (2.0, 0.0)], "picket"))
            .unwrap();
        assert!(store.undo());
        assert!(store.can_redo());
        let version = store.version();

        assert_eq!(
            store.add_item_undoable(fixtures::model_item("a", "swing")),
            Err(StoreError::DuplicateId("a".to_string()))
        );
        assert!(store.remove_item_undoable("ghost").is_err());
        assert!(store
            .update_transform_undoable("ghost", Transform::at([1.0, 0.0, 0.0]))
            .is_err());
        assert!(matches!(
            store.update_points_undoable("a", vec![Point2::new(0.0, 0.0)]),
            Err(StoreError::KindMismatch { .. })
        ));
        assert_eq!(store.version(), version);

        // The undone fence is still one redo away, and only one undo step exists
        assert!(store.redo());
        assert!(store.get_item("x").is_some());
        assert!(store.undo());
        assert!(store.undo());
        assert!(store.is_empty());
        assert!(!store.undo());
    }

    #[test]
    fn test_rejected_points_update_records_nothing() {
        let mut store = fixtures::playground_store();
        let err = store
            .update_points_undoable("fence", vec![Point2::new(0.0, 0.0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::TooFewPoints { required: 2, count: 1, .. }));
        assert!(!store.can_undo());

        store
            .update_points_undoable("fence", vec![Point2::new(0.0, 0.0), Point2::new(3.0, 0.0)])
            .unwrap();
        assert!(store.undo());
        assert_eq!(store.get_item("fence").unwrap().points().unwrap()[1], Point2::new(5.0, -6.0));
        assert!(!store.can_undo());
    }

    #[test]
    fn test_undo_stack_capped() {
        let mut store = MemoryItemStore::new();
        for i in 0..(UNDO_LIMIT + 20) {
            store.snapshot();
            store
                .add_item(fixtures::model_item(&format!("m{i}"), "bench"))
                .unwrap();
        }
        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, UNDO_LIMIT);
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut store = MemoryItemStore::new();
        let v = store.version();
        assert!(!store.undo());
        assert_eq!(store.version(), v);
    }
}
