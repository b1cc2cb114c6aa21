use serde::Serialize;
use shared::Point2;

/// Two-click distance measurement on the ground plane
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasureTool {
    pub start: Option<Point2>,
    pub end: Option<Point2>,
}

impl MeasureTool {
    /// First click starts a segment, second finishes it, third starts over
    pub fn click(&mut self, point: Point2) {
        match (self.start, self.end) {
            (Some(_), None) => self.end = Some(point),
            _ => {
                self.start = Some(point);
                self.end = None;
            }
        }
    }

    pub fn reset(&mut self) {
        self.start = None;
        self.end = None;
    }

    pub fn segment(&self) -> Option<(Point2, Point2)> {
        Some((self.start?, self.end?))
    }

    pub fn length(&self) -> Option<f64> {
        self.segment().map(|(a, b)| a.distance(&b))
    }
}
