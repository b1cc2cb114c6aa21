//! Item store: the authoritative list of placed items
//!
//! The engine only talks to the store through [`ItemStore`]. A full snapshot is
//! read on every synchronization pass; mutations go through the trait methods.
//! The `*_undoable` methods check the mutation first and only record an undo
//! step when it will be applied.

mod history;
mod item_ops;
mod persistence;

use shared::{Item, ItemId, Point2, SceneDocument, Transform};

/// Store mutation errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("unknown item '{0}'")]
    UnknownItem(ItemId),

    #[error("duplicate item id '{0}'")]
    DuplicateId(ItemId),

    #[error("{kind} needs at least {required} points, got {count}")]
    TooFewPoints {
        kind: &'static str,
        required: usize,
        count: usize,
    },

    #[error("item '{id}' is a {kind} and has no control points")]
    KindMismatch { id: ItemId, kind: &'static str },

    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Authoritative item list consumed by the engine
pub trait ItemStore {
    /// Full snapshot of all items, in insertion order
    fn items(&self) -> Vec<Item>;

    fn get_item(&self, id: &str) -> Option<Item> {
        self.items().into_iter().find(|item| item.id == id)
    }

    /// Insert a new item. Rejects duplicate ids and too few control points.
    fn add_item(&mut self, item: Item) -> Result<(), StoreError>;

    fn remove_item(&mut self, id: &str) -> Result<Item, StoreError>;

    fn update_transform(&mut self, id: &str, transform: Transform) -> Result<(), StoreError>;

    /// Replace the control points of a Floor or Fence
    fn update_points(&mut self, id: &str, points: Vec<Point2>) -> Result<(), StoreError>;

    /// Record the current state as an undo step
    fn snapshot(&mut self);

    /// Monotonic change counter
    fn version(&self) -> u64;

    /// Ok when `add_item` would accept `item`
    fn check_add(&self, item: &Item) -> Result<(), StoreError> {
        if self.get_item(&item.id).is_some() {
            return Err(StoreError::DuplicateId(item.id.clone()));
        }
        validate_points(item)
    }

    /// Ok when `update_points` would accept `points` for `id`
    fn check_points(&self, id: &str, points: &[Point2]) -> Result<(), StoreError> {
        let mut item = self
            .get_item(id)
            .ok_or_else(|| StoreError::UnknownItem(id.to_string()))?;
        let kind = item.item_type().label();
        let Some(slot) = item.points_mut() else {
            return Err(StoreError::KindMismatch {
                id: id.to_string(),
                kind,
            });
        };
        *slot = points.to_vec();
        validate_points(&item)
    }

    fn check_exists(&self, id: &str) -> Result<(), StoreError> {
        match self.get_item(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::UnknownItem(id.to_string())),
        }
    }

    fn add_item_undoable(&mut self, item: Item) -> Result<(), StoreError> {
        self.check_add(&item)?;
        self.snapshot();
        self.add_item(item)
    }

    fn remove_item_undoable(&mut self, id: &str) -> Result<Item, StoreError> {
        self.check_exists(id)?;
        self.snapshot();
        self.remove_item(id)
    }

    fn update_transform_undoable(&mut self, id: &str, transform: Transform) -> Result<(), StoreError> {
        self.check_exists(id)?;
        self.snapshot();
        self.update_transform(id, transform)
    }

    fn update_points_undoable(&mut self, id: &str, points: Vec<Point2>) -> Result<(), StoreError> {
        self.check_points(id, &points)?;
        self.snapshot();
        self.update_points(id, points)
    }

    /// Restore the last snapshot. Returns false when there is nothing to undo.
    fn undo(&mut self) -> bool {
        false
    }

    fn redo(&mut self) -> bool {
        false
    }
}

/// In-process item store with undo/redo history
#[derive(Default)]
pub struct MemoryItemStore {
    pub(crate) document: SceneDocument,
    /// Undo stack - previous states
    pub(crate) undo_stack: Vec<SceneDocument>,
    /// Redo stack - undone states
    pub(crate) redo_stack: Vec<SceneDocument>,
    /// Monotonically increasing version counter
    pub(crate) version: u64,
}

/// Maximum number of undo snapshots kept
pub const UNDO_LIMIT: usize = 100;

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from a document, with empty history. Invalid items are
    /// dropped with a warning.
    pub fn from_document(document: SceneDocument) -> Self {
        let mut store = Self::new();
        store.replace_document(document);
        store
    }

    pub fn document(&self) -> &SceneDocument {
        &self.document
    }

    pub fn len(&self) -> usize {
        self.document.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.items.is_empty()
    }

    pub(crate) fn find(&self, id: &str) -> Option<&Item> {
        self.document.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.document.items.iter_mut().find(|item| item.id == id)
    }

    /// Save current state to undo stack
    pub(crate) fn save_undo(&mut self) {
        self.undo_stack.push(self.document.clone());
        if self.undo_stack.len() > UNDO_LIMIT {
            self.undo_stack.remove(0);
        }
    }
}

pub(crate) fn validate_points(item: &Item) -> Result<(), StoreError> {
    item.check_points().map_err(|count| StoreError::TooFewPoints {
        kind: item.item_type().label(),
        required: item.min_points(),
        count,
    })
}

impl ItemStore for MemoryItemStore {
    fn items(&self) -> Vec<Item> {
        self.document.items.clone()
    }

    fn get_item(&self, id: &str) -> Option<Item> {
        self.find(id).cloned()
    }

    fn add_item(&mut self, item: Item) -> Result<(), StoreError> {
        self.insert_item(item)
    }

    fn remove_item(&mut self, id: &str) -> Result<Item, StoreError> {
        self.take_item(id)
    }

    fn update_transform(&mut self, id: &str, transform: Transform) -> Result<(), StoreError> {
        let item = self
            .find_mut(id)
            .ok_or_else(|| StoreError::UnknownItem(id.to_string()))?;
        item.transform = transform;
        self.version += 1;
        Ok(())
    }

    fn update_points(&mut self, id: &str, points: Vec<Point2>) -> Result<(), StoreError> {
        self.check_points(id, &points)?;
        if let Some(slot) = self.find_mut(id).and_then(Item::points_mut) {
            *slot = points;
        }
        self.version += 1;
        Ok(())
    }

    fn snapshot(&mut self) {
        self.save_undo();
        self.redo_stack.clear();
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn undo(&mut self) -> bool {
        MemoryItemStore::undo(self)
    }

    fn redo(&mut self) -> bool {
        MemoryItemStore::redo(self)
    }
}
