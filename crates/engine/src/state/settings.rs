//! Engine settings

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Unit system for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    Millimeters,
    Centimeters,
    #[default]
    Meters,
    Inches,
}

impl Units {
    /// Get the abbreviation for this unit
    pub fn abbrev(&self) -> &'static str {
        match self {
            Units::Millimeters => "mm",
            Units::Centimeters => "cm",
            Units::Meters => "m",
            Units::Inches => "in",
        }
    }

    /// Conversion factor to millimeters
    pub fn to_mm(&self) -> f64 {
        match self {
            Units::Millimeters => 1.0,
            Units::Centimeters => 10.0,
            Units::Meters => 1000.0,
            Units::Inches => 25.4,
        }
    }
}

/// Dimension readout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionSettings {
    /// Font size for dimension values
    pub font_size: f32,
    /// Number of decimal places for dimension values
    pub precision: usize,
    /// Show dimension units suffix
    pub show_units: bool,
}

impl Default for DimensionSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            precision: 2,
            show_units: true,
        }
    }
}

/// Fence construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FenceSettings {
    /// Target length of one fence module; segments are split into ceil(L / module_length)
    pub module_length: f64,
    /// Distance of the rails from the ground and from the post top
    pub rail_inset: f64,
    /// Preset applied to newly drawn fences
    pub default_preset: String,
}

impl Default for FenceSettings {
    fn default() -> Self {
        Self {
            module_length: 2.0,
            rail_inset: 0.15,
            default_preset: "picket".to_string(),
        }
    }
}

/// Floor construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorSettings {
    /// Slab thickness
    pub thickness: f64,
    /// Material applied to newly drawn floors
    pub default_material: String,
    /// Price per square meter for newly drawn floors
    pub price_per_square_meter: f64,
}

impl Default for FloorSettings {
    fn default() -> Self {
        Self {
            thickness: 0.05,
            default_material: "concrete".to_string(),
            price_per_square_meter: 25.0,
        }
    }
}

/// Pointer interaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionSettings {
    /// Draft points closer than this to the previous point are ignored
    pub min_draft_point_distance: f64,
    /// Pick radius around vertex-edit markers
    pub marker_pick_radius: f32,
    /// Manipulator axis length
    pub gizmo_axis_length: f32,
    /// Max ray distance to a manipulator axis that still grabs it
    pub gizmo_pick_threshold: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            min_draft_point_distance: 0.05,
            marker_pick_radius: 0.25,
            gizmo_axis_length: 1.0,
            gizmo_pick_threshold: 0.15,
        }
    }
}

/// Safety zone display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySettings {
    /// Show safety zones (hidden zones are ignored by collision checks)
    pub visible: bool,
    /// Tint of zones without overlap (RGBA)
    pub warning_tint: [f32; 4],
    /// Tint of overlapping zones (RGBA)
    pub alert_tint: [f32; 4],
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            visible: true,
            warning_tint: [1.0, 0.8, 0.0, 0.25],
            alert_tint: [1.0, 0.1, 0.1, 0.6],
        }
    }
}

/// Drag revert animation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertSettings {
    /// Duration in seconds
    pub duration: f64,
}

impl Default for RevertSettings {
    fn default() -> Self {
        Self { duration: 0.3 }
    }
}

/// Settings errors
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// All engine settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineSettings {
    /// Display units
    #[serde(default)]
    pub units: Units,
    /// Dimension display settings
    #[serde(default)]
    pub dimensions: DimensionSettings,
    #[serde(default)]
    pub fence: FenceSettings,
    #[serde(default)]
    pub floor: FloorSettings,
    #[serde(default)]
    pub interaction: InteractionSettings,
    #[serde(default)]
    pub safety: SafetySettings,
    #[serde(default)]
    pub revert: RevertSettings,
}

impl EngineSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "yardplan", "yardplan")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the user config dir, or return default if not found
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match Self::load_from_path(&path) {
            Ok(settings) => settings,
            Err(SettingsError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("Ignoring invalid settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings to the user config dir
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(path) = Self::config_path() {
            self.save_to_path(&path)?;
        }
        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
