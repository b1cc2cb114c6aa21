//! Model assets: provider trait, concrete providers and the caching loader.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::viewport::mesh::MeshData;
use crate::viewport::picking::Aabb;

/// Named safety envelope in model-local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyZoneDef {
    pub name: String,
    pub min: [f32; 3],
    pub max: [f32; 3],
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

impl SafetyZoneDef {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(Vec3::from_array(self.min), Vec3::from_array(self.max))
    }
}

/// Loaded model geometry plus its safety zones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelAsset {
    pub mesh: MeshData,
    #[serde(default)]
    pub safety_zones: Vec<SafetyZoneDef>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("asset '{0}' not found")]
    NotFound(String),

    #[error("failed to read asset '{reference}': {message}")]
    Io { reference: String, message: String },

    #[error("failed to parse asset '{reference}': {message}")]
    Parse { reference: String, message: String },
}

/// Source of model assets. Implementations may block; the loader moves calls
/// off the update thread when it has a runtime.
pub trait AssetProvider: Send + Sync {
    fn load_model(&self, reference: &str) -> Result<ModelAsset, AssetError>;
}

/// Reads `<root>/<reference>.json`
#[derive(Debug, Clone)]
pub struct DirectoryAssetProvider {
    root: PathBuf,
}

impl DirectoryAssetProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetProvider for DirectoryAssetProvider {
    fn load_model(&self, reference: &str) -> Result<ModelAsset, AssetError> {
        if reference.is_empty() || reference.split(['/', '\\']).any(|part| part == "..") {
            return Err(AssetError::NotFound(reference.to_string()));
        }
        let path = self.root.join(format!("{reference}.json"));
        let json = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(reference.to_string()),
            _ => AssetError::Io {
                reference: reference.to_string(),
                message: e.to_string(),
            },
        })?;
        serde_json::from_str(&json).map_err(|e| AssetError::Parse {
            reference: reference.to_string(),
            message: e.to_string(),
        })
    }
}

/// Fixed map of assets, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetProvider {
    assets: HashMap<String, ModelAsset>,
}

impl InMemoryAssetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reference: impl Into<String>, asset: ModelAsset) -> Self {
        self.insert(reference, asset);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, asset: ModelAsset) {
        self.assets.insert(reference.into(), asset);
    }
}

impl AssetProvider for InMemoryAssetProvider {
    fn load_model(&self, reference: &str) -> Result<ModelAsset, AssetError> {
        self.assets
            .get(reference)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(reference.to_string()))
    }
}

/// Result of an asset request
#[derive(Debug, Clone)]
pub enum AssetState {
    Ready(Arc<ModelAsset>),
    Pending,
    Failed(AssetError),
}

type LoadResult = (String, Result<ModelAsset, AssetError>);

/// Cache-by-reference asset loader.
///
/// Each reference is fetched at most once. Failures are cached too, so a
/// missing asset is reported once and then skipped quietly.
pub struct AssetLoader {
    provider: Arc<dyn AssetProvider>,
    cache: HashMap<String, Arc<ModelAsset>>,
    failed: HashMap<String, AssetError>,
    pending: HashSet<String>,
    tx: mpsc::UnboundedSender<LoadResult>,
    rx: mpsc::UnboundedReceiver<LoadResult>,
    runtime: Option<Handle>,
}

impl AssetLoader {
    /// Loader that calls the provider inline on `request`
    pub fn new(provider: Arc<dyn AssetProvider>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            provider,
            cache: HashMap::new(),
            failed: HashMap::new(),
            pending: HashSet::new(),
            tx,
            rx,
            runtime: None,
        }
    }

    /// Loader that runs provider calls on the runtime's blocking pool
    pub fn with_runtime(provider: Arc<dyn AssetProvider>, runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
            ..Self::new(provider)
        }
    }

    pub fn is_async(&self) -> bool {
        self.runtime.is_some()
    }

    pub fn request(&mut self, reference: &str) -> AssetState {
        if let Some(asset) = self.cache.get(reference) {
            return AssetState::Ready(Arc::clone(asset));
        }
        if let Some(err) = self.failed.get(reference) {
            return AssetState::Failed(err.clone());
        }
        if self.pending.contains(reference) {
            return AssetState::Pending;
        }

        match &self.runtime {
            Some(handle) => {
                let provider = Arc::clone(&self.provider);
                let tx = self.tx.clone();
                let reference_owned = reference.to_string();
                self.pending.insert(reference.to_string());
                tracing::debug!("Loading asset '{}' in background", reference);
                handle.spawn_blocking(move || {
                    let result = provider.load_model(&reference_owned);
                    // Receiver gone means the loader was dropped
                    let _ = tx.send((reference_owned, result));
                });
                AssetState::Pending
            }
            None => {
                let result = self.provider.load_model(reference);
                self.store_result(reference.to_string(), result)
            }
        }
    }

    /// Drain completed background loads. Returns how many finished.
    pub fn poll(&mut self) -> usize {
        let mut finished = 0;
        while let Ok((reference, result)) = self.rx.try_recv() {
            self.pending.remove(&reference);
            self.store_result(reference, result);
            finished += 1;
        }
        finished
    }

    fn store_result(&mut self, reference: String, result: Result<ModelAsset, AssetError>) -> AssetState {
        match result {
            Ok(asset) => {
                let asset = Arc::new(asset);
                self.cache.insert(reference, Arc::clone(&asset));
                AssetState::Ready(asset)
            }
            Err(err) => {
                tracing::warn!("Asset load failed: {}", err);
                self.failed.insert(reference, err.clone());
                AssetState::Failed(err)
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        inner: InMemoryAssetProvider,
        calls: AtomicUsize,
    }

    impl AssetProvider for CountingProvider {
        fn load_model(&self, reference: &str) -> Result<ModelAsset, AssetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.load_model(reference)
        }
    }

    #[test]
    fn test_inline_load_is_cached() {
        let provider = Arc::new(CountingProvider {
            inner: fixtures::asset_provider(),
            calls: AtomicUsize::new(0),
        });
        let mut loader = AssetLoader::new(provider.clone());
        assert!(matches!(loader.request("swing"), AssetState::Ready(_)));
        assert!(matches!(loader.request("swing"), AssetState::Ready(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.cached_count(), 1);
    }

    #[test]
    fn test_failure_cached() {
        let provider = Arc::new(CountingProvider {
            inner: InMemoryAssetProvider::new(),
            calls: AtomicUsize::new(0),
        });
        let mut loader = AssetLoader::new(provider.clone());
        assert!(matches!(
            loader.request("ghost"),
            AssetState::Failed(AssetError::NotFound(_))
        ));
        assert!(matches!(loader.request("ghost"), AssetState::Failed(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_background_load_delivered_by_poll() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut loader = AssetLoader::with_runtime(Arc::new(fixtures::asset_provider()), rt.handle().clone());
        assert!(matches!(loader.request("swing"), AssetState::Pending));
        assert!(matches!(loader.request("swing"), AssetState::Pending));

        let mut ready = false;
        for _ in 0..200 {
            loader.poll();
            if let AssetState::Ready(asset) = loader.request("swing") {
                assert!(!asset.safety_zones.is_empty());
                ready = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(ready);
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn test_directory_provider() {
        let dir = std::env::temp_dir().join(format!("yardplan-assets-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let asset = fixtures::model_asset(1.0, 1.0, 1.0, 0.5);
        std::fs::write(dir.join("bench.json"), serde_json::to_string(&asset).unwrap()).unwrap();
        std::fs::write(dir.join("broken.json"), "{ nope").unwrap();

        let provider = DirectoryAssetProvider::new(&dir);
        assert_eq!(provider.load_model("bench").unwrap(), asset);
        assert!(matches!(provider.load_model("missing"), Err(AssetError::NotFound(_))));
        assert!(matches!(provider.load_model("broken"), Err(AssetError::Parse { .. })));
        assert!(matches!(provider.load_model("../bench"), Err(AssetError::NotFound(_))));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_zone_json_defaults_visible() {
        let zone: SafetyZoneDef =
            serde_json::from_str(r#"{"name": "fall", "min": [-1,0,-1], "max": [1,2,1]}"#).unwrap();
        assert!(zone.visible);
        assert_eq!(zone.bounds().size(), Vec3::new(2.0, 2.0, 2.0));
    }
}
