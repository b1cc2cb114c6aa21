pub mod selection;
pub mod settings;
pub mod store;

pub use selection::{VertexSelection, MAX_VERTEX_SELECTION};
pub use settings::{DimensionSettings, EngineSettings, SettingsError, Units};
pub use store::{ItemStore, MemoryItemStore, StoreError};
