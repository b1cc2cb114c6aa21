//! Item insert/remove operations

use shared::Item;

use super::{validate_points, MemoryItemStore, StoreError};

impl MemoryItemStore {
    /// Insert an item without recording an undo step
    pub(crate) fn insert_item(&mut self, item: Item) -> Result<(), StoreError> {
        if self.find(&item.id).is_some() {
            return Err(StoreError::DuplicateId(item.id));
        }
        validate_points(&item)?;
        tracing::debug!("Store: added {} '{}'", item.item_type().label(), item.id);
        self.document.items.push(item);
        self.version += 1;
        Ok(())
    }

    pub(crate) fn take_item(&mut self, id: &str) -> Result<Item, StoreError> {
        let idx = self
            .document
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| StoreError::UnknownItem(id.to_string()))?;
        let item = self.document.items.remove(idx);
        tracing::debug!("Store: removed '{}'", id);
        self.version += 1;
        Ok(item)
    }

    /// Remove every item (undoable)
    pub fn clear(&mut self) {
        if self.document.items.is_empty() {
            return;
        }
        self.save_undo();
        self.redo_stack.clear();
        self.document.items.clear();
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::state::store::ItemStore;

    #[test]
    fn test_remove_keeps_order_of_rest() {
        let mut store = MemoryItemStore::new();
        for id in ["a", "b", "c"] {
            store.add_item(fixtures::model_item(id, "bench")).unwrap();
        }
        let removed = store.remove_item("b").unwrap();
        assert_eq!(removed.id, "b");
        let ids: Vec<_> = store.items().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(matches!(store.remove_item("b"), Err(StoreError::UnknownItem(_))));
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut store = MemoryItemStore::new();
        store.add_item(fixtures::model_item("a", "bench")).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(store.undo());
        assert_eq!(store.len(), 1);
    }
}
