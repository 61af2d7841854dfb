//! Core image types and geometry for synthetic scene compositing.
//!
//! This crate knows nothing about datasets, directories or randomness. It
//! provides the pixel-level pieces the compositing stages are built from:
//! binary placement masks, integer boxes and placements, area-averaging
//! resize and the size-preserving rotation warp.
//!
//! Images are plain `image` crate buffers (`RgbImage`, `RgbaImage`,
//! `GrayImage`); the only new image-like type is [`Mask`].

mod geometry;
mod logger;
mod mask;
mod resize;
mod rotation;

pub use geometry::{BoundingBox, Placement};
pub use mask::{Mask, PlaceableIntegral};
pub use resize::{resize_area, scaled_dimensions};
pub use rotation::{warp_rotation_rgba, RotationTransform, TRANSPARENT};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, parse_level, LOG_ENV};
