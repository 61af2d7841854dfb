//! Run a batch from a JSON config:
//!
//! ```text
//! cargo run -p scene-synth --example generate_dataset -- run.json
//! ```
//!
//! Minimal config:
//!
//! ```json
//! {
//!   "backgrounds_dir": "backgrounds",
//!   "foregrounds_dir": "features",
//!   "images_dir": "synthetic",
//!   "annotations_dir": "annotations",
//!   "count": 200,
//!   "params": { "seed": 42 }
//! }
//! ```

use std::env;
use std::path::PathBuf;

use scene_synth::{DatasetGenerator, DatasetInventory, GenerateConfig, LogSink};

#[cfg(not(feature = "tracing"))]
use log::{info, LevelFilter};

#[cfg(feature = "tracing")]
use tracing::info;

#[cfg(feature = "tracing")]
use scene_synth::core::init_tracing;
#[cfg(not(feature = "tracing"))]
use scene_synth::core::init_from_env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tracing"))]
    {
        let level = init_from_env(LevelFilter::Info)?;
        info!("logging at {level} (override with SCENE_SYNTH_LOG)");
    }

    #[cfg(feature = "tracing")]
    init_tracing(false);

    run()
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(config_path) = env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: generate_dataset <config.json>");
        return Ok(());
    };

    let cfg = GenerateConfig::load_json(&config_path)?;
    let layout = cfg.layout();
    info!("config {} loaded", config_path.display());

    let generator = DatasetGenerator::new(cfg.params.clone());
    let summary = generator.generate(&layout, cfg.count, &mut LogSink)?;
    info!(
        "done: {} generated, {} load, {} placement, {} save, {} other failures",
        summary.generated,
        summary.load_failures,
        summary.placement_failures,
        summary.save_failures,
        summary.other_failures
    );

    let inventory = DatasetInventory::scan(&layout, &cfg.params.sources, &cfg.params.output)?;
    info!(
        "{} images and {} annotations on disk ({} unpaired)",
        inventory.images,
        inventory.annotations,
        inventory.unpaired()
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
