use serde::Serialize;

/// Maximum number of selected control points
pub const MAX_VERTEX_SELECTION: usize = 3;

/// Ordered selection of control point indices on the edited Floor/Fence.
///
/// Order carries meaning: entry 0 is the reference, entry 1 the pivot (and the
/// movable point of a distance edit), entry 2 the movable point of an angle edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VertexSelection {
    indices: Vec<usize>,
    /// Version counter for selection changes
    #[serde(skip)]
    version: u64,
}

impl VertexSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick a control point. Without `extend` the selection becomes exactly
    /// `[index]`; with `extend` membership is toggled and the oldest entry is
    /// evicted when a fourth point would be added.
    pub fn pick(&mut self, index: usize, extend: bool) {
        if !extend {
            self.indices.clear();
            self.indices.push(index);
        } else if let Some(pos) = self.indices.iter().position(|&i| i == index) {
            self.indices.remove(pos);
        } else {
            if self.indices.len() == MAX_VERTEX_SELECTION {
                self.indices.remove(0);
            }
            self.indices.push(index);
        }
        self.version += 1;
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn reference(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    pub fn pivot(&self) -> Option<usize> {
        self.indices.get(1).copied()
    }

    /// Point moved by an angle edit; only defined with exactly three entries
    pub fn movable(&self) -> Option<usize> {
        if self.indices.len() == MAX_VERTEX_SELECTION {
            self.indices.get(2).copied()
        } else {
            None
        }
    }

    /// (anchor, movable) of a distance edit
    pub fn distance_pair(&self) -> Option<(usize, usize)> {
        Some((self.reference()?, self.pivot()?))
    }

    /// Reverse a two-entry selection. Returns false (and does nothing) otherwise.
    pub fn swap(&mut self) -> bool {
        if self.indices.len() != 2 {
            return false;
        }
        self.indices.swap(0, 1);
        self.version += 1;
        true
    }

    pub fn clear(&mut self) {
        if !self.indices.is_empty() {
            self.indices.clear();
            self.version += 1;
        }
    }

    /// Drop indices that no longer address a point
    pub fn retain_valid(&mut self, point_count: usize) {
        let before = self.indices.len();
        self.indices.retain(|&i| i < point_count);
        if self.indices.len() != before {
            self.version += 1;
        }
    }
}
