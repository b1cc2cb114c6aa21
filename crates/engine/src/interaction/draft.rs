use shared::{ItemType, Point2, MIN_FENCE_POINTS, MIN_FLOOR_POINTS};

/// Points collected while drawing a Floor or Fence
#[derive(Debug, Clone, PartialEq)]
pub struct DraftShape {
    pub kind: ItemType,
    points: Vec<Point2>,
}

impl DraftShape {
    pub fn new(kind: ItemType) -> Self {
        Self {
            kind,
            points: Vec::new(),
        }
    }

    /// Append a point unless it lies within `min_distance` of the previous one
    pub fn push(&mut self, point: Point2, min_distance: f64) -> bool {
        if self
            .points
            .last()
            .is_some_and(|last| last.distance(&point) < min_distance)
        {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min_points(&self) -> usize {
        match self.kind {
            ItemType::Floor => MIN_FLOOR_POINTS,
            ItemType::Fence => MIN_FENCE_POINTS,
            ItemType::Model => 1,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() >= self.min_points()
    }

    /// Take the points if enough were drawn, leaving the draft empty
    pub fn take_if_complete(&mut self) -> Option<Vec<Point2>> {
        self.is_complete().then(|| std::mem::take(&mut self.points))
    }
}
