//! Compositing stages for synthetic object-detection scenes.
//!
//! Each stage is a small, independently testable piece:
//! - [`RegionDetector`]: HSV threshold + morphology -> placeable [`Mask`],
//! - [`Transformer`]: random area-resize + rotation of an RGBA cut-out,
//! - [`PlacementSampler`]: bounded rejection search for a top-left corner,
//! - [`composite`]: binary alpha overwrite onto a copy of the background,
//! - [`extract_bbox`]: tight box around the opaque pixels,
//! - [`YoloAnnotation`]: normalized single-class label line.
//!
//! Randomized stages take the RNG as an argument; nothing here touches
//! global random state or the filesystem except the annotation writer.
//!
//! [`Mask`]: scene_synth_core::Mask

mod annotation;
mod bbox;
mod composite;
mod error;
mod placement;
mod region;
mod transform;

pub use annotation::{read_annotation, write_annotation, YoloAnnotation};
pub use bbox::extract_bbox;
pub use composite::{composite, preview_mask};
pub use error::{AnnotationError, ComposeError};
pub use placement::{PlacementParams, PlacementResult, PlacementSampler};
pub use region::{rgb_to_hsv, HsvRange, RegionDetector, RegionParams};
pub use transform::{TransformParams, TransformedForeground, Transformer};
