use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use shared::PresetLibrary;
use yardplan_engine_lib::engine::Engine;
use yardplan_engine_lib::state::{EngineSettings, MemoryItemStore};
use yardplan_engine_lib::sync::{AssetLoader, AssetProvider, DirectoryAssetProvider, InMemoryAssetProvider};

/// Seconds of simulated time per tick
const TICK: f64 = 1.0 / 60.0;

struct Args {
    scene: PathBuf,
    assets: Option<PathBuf>,
    ticks: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yardplan_engine=info".into()),
        )
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("usage: yardplan-engine --scene <file.json> [--assets <dir>] [--ticks N]");
            std::process::exit(2);
        }
    };

    let store = match MemoryItemStore::load_from_path(&args.scene) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to load scene: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Loaded {} items from {}", store.len(), args.scene.display());

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let provider: Arc<dyn AssetProvider> = match &args.assets {
        Some(dir) => Arc::new(DirectoryAssetProvider::new(dir)),
        None => {
            tracing::warn!("No --assets directory given, model items will be skipped");
            Arc::new(InMemoryAssetProvider::new())
        }
    };
    let assets = AssetLoader::with_runtime(provider, runtime.handle().clone());

    let mut engine = Engine::new(store, EngineSettings::load(), PresetLibrary::builtin(), assets);

    let mut now = 0.0;
    for tick in 0..args.ticks {
        let frame = engine.tick(now);
        now += TICK;

        let s = &frame.sync;
        if !s.is_structurally_unchanged() || !s.pending.is_empty() || !s.skipped.is_empty() {
            tracing::info!(
                "tick {}: created {}, rebuilt {}, removed {}, pending {}, skipped {}",
                tick,
                s.created.len(),
                s.rebuilt.len(),
                s.removed.len(),
                s.pending.len(),
                s.skipped.len()
            );
        }
        for (id, reason) in &s.skipped {
            tracing::warn!("  skipped '{id}': {reason}");
        }
        for (a, b) in &frame.collisions.pairs {
            tracing::warn!(
                "  safety zone overlap: {}#{} <-> {}#{}",
                a.item_id,
                a.zone,
                b.item_id,
                b.zone
            );
        }

        // Give background loads a chance to land
        if !s.pending.is_empty() {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    tracing::info!(
        "Finished {} ticks, {} live objects",
        engine.ticks(),
        engine.scene().len()
    );
}

fn parse_args() -> Result<Args, String> {
    let mut scene = None;
    let mut assets = None;
    let mut ticks = 1;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or(format!("{arg} needs a value"));
        match arg.as_str() {
            "--scene" => scene = Some(PathBuf::from(value()?)),
            "--assets" => assets = Some(PathBuf::from(value()?)),
            "--ticks" => {
                ticks = value()?
                    .parse()
                    .map_err(|e| format!("invalid --ticks: {e}"))?
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(Args {
        scene: scene.ok_or("--scene is required")?,
        assets,
        ticks,
    })
}
