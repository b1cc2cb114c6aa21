//! Safety-zone overlap detection.
//!
//! Every frame the visible safety zones of all live objects are resolved to
//! world AABBs and tested pairwise. Zones of the same item never collide with
//! each other. The same test backs the drag gate: a drag ending in overlap is
//! reverted instead of committed.

use serde::Serialize;
use shared::ItemId;

use crate::state::settings::SafetySettings;
use crate::sync::{SceneGraph, WorldZone};
use crate::viewport::picking::Aabb;

/// Identifies one safety zone: owning item plus zone index in its asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ZoneRef {
    pub item_id: ItemId,
    pub zone: usize,
}

/// Per-frame state of one visible zone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneState {
    pub zone: ZoneRef,
    pub name: String,
    #[serde(skip)]
    pub bounds: Aabb,
    pub colliding: bool,
    /// RGBA overlay tint
    pub tint: [f32; 4],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollisionReport {
    pub zones: Vec<ZoneState>,
    /// Overlapping zone pairs, each ordered and listed once
    pub pairs: Vec<(ZoneRef, ZoneRef)>,
}

impl CollisionReport {
    pub fn has_collisions(&self) -> bool {
        !self.pairs.is_empty()
    }

    /// True when some zone of `a` overlaps some zone of `b`
    pub fn is_flagged(&self, a: &str, b: &str) -> bool {
        self.pairs.iter().any(|(x, y)| {
            (x.item_id == a && y.item_id == b) || (x.item_id == b && y.item_id == a)
        })
    }

    /// Ids of items with at least one colliding zone
    pub fn colliding_items(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self
            .zones
            .iter()
            .filter(|z| z.colliding)
            .map(|z| z.zone.item_id.clone())
            .collect();
        ids.dedup();
        ids
    }
}

#[derive(Debug, Clone)]
pub struct SafetyZoneDetector {
    /// Global zone visibility; hidden zones are ignored
    pub visible: bool,
    pub warning_tint: [f32; 4],
    pub alert_tint: [f32; 4],
}

impl Default for SafetyZoneDetector {
    fn default() -> Self {
        Self::from_settings(&SafetySettings::default())
    }
}

impl SafetyZoneDetector {
    pub fn from_settings(settings: &SafetySettings) -> Self {
        Self {
            visible: settings.visible,
            warning_tint: settings.warning_tint,
            alert_tint: settings.alert_tint,
        }
    }

    fn visible_zones(&self, scene: &SceneGraph) -> Vec<WorldZone> {
        if !self.visible {
            return Vec::new();
        }
        scene
            .iter()
            .flat_map(|obj| obj.world_safety_zones())
            .filter(|z| z.visible)
            .collect()
    }

    /// Test all visible zone pairs
    pub fn detect(&self, scene: &SceneGraph) -> CollisionReport {
        let zones = self.visible_zones(scene);
        let mut colliding = vec![false; zones.len()];
        let mut pairs = Vec::new();

        for i in 0..zones.len() {
            for j in (i + 1)..zones.len() {
                let (a, b) = (&zones[i], &zones[j]);
                if a.item_id == b.item_id || !a.bounds.intersects(&b.bounds) {
                    continue;
                }
                colliding[i] = true;
                colliding[j] = true;
                pairs.push((zone_ref(a), zone_ref(b)));
            }
        }

        let zones = zones
            .into_iter()
            .zip(colliding)
            .map(|(z, hit)| ZoneState {
                zone: zone_ref(&z),
                name: z.name,
                bounds: z.bounds,
                colliding: hit,
                tint: if hit { self.alert_tint } else { self.warning_tint },
            })
            .collect();

        CollisionReport { zones, pairs }
    }

    /// Would any visible zone of `id` overlap a visible zone of another item?
    pub fn collides(&self, scene: &SceneGraph, id: &str) -> bool {
        let zones = self.visible_zones(scene);
        let (own, others): (Vec<_>, Vec<_>) = zones.iter().partition(|z| z.item_id == id);
        own.iter()
            .any(|a| others.iter().any(|b| a.bounds.intersects(&b.bounds)))
    }
}

fn zone_ref(zone: &WorldZone) -> ZoneRef {
    ZoneRef {
        item_id: zone.item_id.clone(),
        zone: zone.index,
    }
}
