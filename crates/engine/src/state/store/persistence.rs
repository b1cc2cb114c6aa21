//! Scene document load/save

use std::path::Path;

use shared::SceneDocument;

use super::{MemoryItemStore, StoreError};

impl MemoryItemStore {
    /// Replace the whole item list (undoable). Items violating the store
    /// invariants are skipped with a warning. Returns the number loaded.
    pub fn load_document(&mut self, document: SceneDocument) -> usize {
        self.save_undo();
        self.redo_stack.clear();
        self.replace_document(document)
    }

    /// Replace the item list without touching history
    pub(crate) fn replace_document(&mut self, document: SceneDocument) -> usize {
        self.document = SceneDocument {
            version: document.version,
            items: Vec::with_capacity(document.items.len()),
        };
        for item in document.items {
            let id = item.id.clone();
            if let Err(e) = self.insert_item(item) {
                tracing::warn!("Skipping item '{}' while loading scene: {}", id, e);
            }
        }
        self.version += 1;
        self.document.items.len()
    }

    pub fn load_from_path(path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Persistence(format!("{}: {e}", path.display())))?;
        let document: SceneDocument = serde_json::from_str(&json)
            .map_err(|e| StoreError::Persistence(format!("{}: {e}", path.display())))?;
        Ok(Self::from_document(document))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.document)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| StoreError::Persistence(format!("{}: {e}", path.display())))
    }
}
