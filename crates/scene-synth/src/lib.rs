//! Synthetic object-detection dataset generator.
//!
//! Given a folder of background scenes and a folder of RGBA cut-outs
//! (transparent everywhere except the object), each generated sample is:
//!
//! 1. a random background and a random cut-out,
//! 2. the background's placeable region (HSV threshold + morphology),
//! 3. the cut-out shrunk and rotated by random amounts,
//! 4. a rejection-sampled top-left corner over the placeable region,
//! 5. the cut-out pasted onto a copy of the background,
//! 6. one normalized single-class label for the pasted object.
//!
//! Outputs are `synthetic_image_001.jpg` + `synthetic_image_001.txt` and
//! so on. Per-item failures are reported through a [`ProgressSink`] and
//! never stop the batch.
//!
//! ## Quickstart
//!
//! ```no_run
//! use scene_synth::{DatasetGenerator, DatasetLayout, GeneratorParams, LogSink};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = DatasetLayout::new("backgrounds", "features", "synthetic", "annotations");
//! let params = GeneratorParams {
//!     seed: Some(42),
//!     ..GeneratorParams::default()
//! };
//! let summary = DatasetGenerator::new(params).generate(&layout, 200, &mut LogSink)?;
//! println!("{} of {} generated", summary.generated, summary.requested);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `scene_synth::core`: masks, boxes, resize and rotation primitives.
//! - `scene_synth::compose`: the individual stages.
//! - [`DatasetGenerator`]: the batch orchestrator.
//! - [`GenerateConfig`]: JSON run configuration.

pub use scene_synth_compose as compose;
pub use scene_synth_core as core;

mod error;
mod generator;
mod inventory;
mod io;
mod params;
mod progress;

pub use error::{DatasetError, FailureKind, ItemError, SceneError};
pub use generator::{
    generate, DatasetGenerator, DatasetLayout, GeneratedItem, GenerationSummary, SyntheticScene,
};
pub use inventory::{list_images, DatasetInventory};
pub use io::{ConfigError, GenerateConfig};
pub use params::{GeneratorParams, OutputParams, SourceFilter};
pub use progress::{CallbackSink, CollectSink, LogSink, ProgressEvent, ProgressSink, WriterSink};
