//! Fence presets: immutable geometry templates looked up by id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cross-section of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostShape {
    Square,
    Round,
}

/// Cross-section of a rail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RailShape {
    Square,
    Round,
}

/// How slats fill a module
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SlatLayout {
    /// As many slats as fit with the given gap
    Gap { gap: f64 },
    /// Exactly `count` slats per module
    Fixed { count: u32 },
    /// One slat stretched over the whole module
    SolidPanel,
}

/// Geometry template of a fence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FencePreset {
    pub id: String,
    pub name: String,
    pub post_shape: PostShape,
    /// Post width (square) or diameter (round)
    pub post_size: f64,
    pub post_height: f64,
    /// Rail cross-section; `None` for fences without rails
    #[serde(default)]
    pub rail: Option<RailShape>,
    #[serde(default)]
    pub rail_size: f64,
    pub slat_width: f64,
    pub slat_thickness: f64,
    /// Slat height; defaults to the post height minus ground clearance
    #[serde(default)]
    pub slat_height: Option<f64>,
    pub layout: SlatLayout,
    #[serde(default)]
    pub multi_color: bool,
    /// Price per running meter
    #[serde(default)]
    pub price_per_meter: f64,
}

impl FencePreset {
    /// Ground clearance under slats
    pub const SLAT_CLEARANCE: f64 = 0.05;

    pub fn has_rails(&self) -> bool {
        self.rail.is_some()
    }

    pub fn is_solid_panel(&self) -> bool {
        matches!(self.layout, SlatLayout::SolidPanel)
    }

    pub fn effective_slat_height(&self) -> f64 {
        self.slat_height
            .unwrap_or(self.post_height - Self::SLAT_CLEARANCE * 2.0)
            .max(0.0)
    }
}

/// Error loading a preset library
#[derive(Debug, Clone, PartialEq)]
pub enum PresetError {
    Parse(String),
    Duplicate(String),
}

impl std::fmt::Display for PresetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresetError::Parse(msg) => write!(f, "Preset parse error: {}", msg),
            PresetError::Duplicate(id) => write!(f, "Duplicate preset id '{}'", id),
        }
    }
}

impl std::error::Error for PresetError {}

/// Read-only lookup table of fence presets
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    presets: HashMap<String, FencePreset>,
}

impl PresetLibrary {
    /// Build a library, rejecting duplicate ids
    pub fn new(presets: Vec<FencePreset>) -> Result<Self, PresetError> {
        let mut map = HashMap::with_capacity(presets.len());
        for preset in presets {
            if map.contains_key(&preset.id) {
                return Err(PresetError::Duplicate(preset.id));
            }
            map.insert(preset.id.clone(), preset);
        }
        Ok(Self { presets: map })
    }

    /// Parse a JSON array of presets
    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        let presets: Vec<FencePreset> =
            serde_json::from_str(json).map_err(|e| PresetError::Parse(e.to_string()))?;
        Self::new(presets)
    }

    pub fn get(&self, id: &str) -> Option<&FencePreset> {
        self.presets.get(id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Built-in catalog
    pub fn builtin() -> Self {
        let presets = vec![
            FencePreset {
                id: "picket".to_string(),
                name: "Picket".to_string(),
                post_shape: PostShape::Square,
                post_size: 0.09,
                post_height: 1.2,
                rail: Some(RailShape::Square),
                rail_size: 0.045,
                slat_width: 0.08,
                slat_thickness: 0.02,
                slat_height: None,
                layout: SlatLayout::Gap { gap: 0.05 },
                multi_color: false,
                price_per_meter: 42.0,
            },
            FencePreset {
                id: "privacy".to_string(),
                name: "Privacy Panel".to_string(),
                post_shape: PostShape::Square,
                post_size: 0.12,
                post_height: 1.8,
                rail: None,
                rail_size: 0.0,
                slat_width: 0.1,
                slat_thickness: 0.03,
                slat_height: None,
                layout: SlatLayout::SolidPanel,
                multi_color: false,
                price_per_meter: 95.0,
            },
            FencePreset {
                id: "ranch".to_string(),
                name: "Ranch Rail".to_string(),
                post_shape: PostShape::Round,
                post_size: 0.12,
                post_height: 1.1,
                rail: Some(RailShape::Round),
                rail_size: 0.06,
                slat_width: 0.14,
                slat_thickness: 0.03,
                slat_height: Some(0.9),
                layout: SlatLayout::Fixed { count: 3 },
                multi_color: false,
                price_per_meter: 30.0,
            },
            FencePreset {
                id: "playground".to_string(),
                name: "Playground Multicolor".to_string(),
                post_shape: PostShape::Round,
                post_size: 0.1,
                post_height: 1.0,
                rail: Some(RailShape::Round),
                rail_size: 0.05,
                slat_width: 0.1,
                slat_thickness: 0.025,
                slat_height: None,
                layout: SlatLayout::Gap { gap: 0.06 },
                multi_color: true,
                price_per_meter: 68.0,
            },
        ];
        // Built-in ids are distinct
        Self::new(presets).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let lib = PresetLibrary::builtin();
        assert_eq!(lib.len(), 4);
        assert_eq!(lib.ids(), vec!["picket", "playground", "privacy", "ranch"]);
        assert!(lib.get("privacy").unwrap().is_solid_panel());
        assert!(!lib.get("privacy").unwrap().has_rails());
    }

    #[test]
    fn test_duplicate_rejected() {
        let lib = PresetLibrary::builtin();
        let p = lib.get("picket").unwrap().clone();
        let err = PresetLibrary::new(vec![p.clone(), p]).unwrap_err();
        assert_eq!(err, PresetError::Duplicate("picket".to_string()));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[{
            "id": "low",
            "name": "Low",
            "post_shape": "square",
            "post_size": 0.08,
            "post_height": 0.6,
            "slat_width": 0.1,
            "slat_thickness": 0.02,
            "layout": {"mode": "fixed", "count": 4}
        }]"#;
        let lib = PresetLibrary::from_json(json).unwrap();
        let low = lib.get("low").unwrap();
        assert_eq!(low.layout, SlatLayout::Fixed { count: 4 });
        assert!(!low.has_rails());
        assert!((low.effective_slat_height() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            PresetLibrary::from_json("{"),
            Err(PresetError::Parse(_))
        ));
    }
}
