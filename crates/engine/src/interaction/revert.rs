use shared::{ItemId, Transform};

use crate::helpers::lerp_transform;

/// Time-driven slide of a live object back to its pre-drag transform
#[derive(Debug, Clone, PartialEq)]
pub struct RevertAnimation {
    pub item_id: ItemId,
    pub from: Transform,
    pub to: Transform,
    pub started_at: f64,
    pub duration: f64,
}

impl RevertAnimation {
    pub fn new(item_id: ItemId, from: Transform, to: Transform, now: f64, duration: f64) -> Self {
        Self {
            item_id,
            from,
            to,
            started_at: now,
            duration,
        }
    }

    /// Progress in [0, 1]
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn sample(&self, now: f64) -> Transform {
        lerp_transform(&self.from, &self.to, self.progress(now))
    }
}
