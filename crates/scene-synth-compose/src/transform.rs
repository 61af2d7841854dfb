use image::RgbaImage;
use rand::Rng;
use scene_synth_core::{resize_area, scaled_dimensions, warp_rotation_rgba, RotationTransform};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Sampling ranges for [`Transformer`]. Both ranges are half-open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    pub scale_min: f64,
    pub scale_max: f64,
    pub angle_min_deg: f64,
    pub angle_max_deg: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            scale_min: 0.4,
            scale_max: 0.8,
            angle_min_deg: 0.0,
            angle_max_deg: 360.0,
        }
    }
}

/// A cut-out after scaling and rotation, with the parameters that made it.
#[derive(Clone, Debug)]
pub struct TransformedForeground {
    pub image: RgbaImage,
    pub scale: f64,
    pub angle_deg: f64,
    /// Rotation applied to the resized cut-out; `image` has the resized size.
    pub rotation: RotationTransform,
}

impl TransformedForeground {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// Randomly shrinks and rotates foreground cut-outs.
///
/// Stateless: every call draws a fresh scale and angle from the RNG it is
/// given, so two calls with the same seeded RNG state produce the same
/// output.
#[derive(Clone, Debug, Default)]
pub struct Transformer {
    params: TransformParams,
}

impl Transformer {
    pub fn new(params: TransformParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    /// Draw a scale and an angle, then [`Transformer::apply`] them.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, foreground, rng), fields(width = foreground.width(), height = foreground.height()))
    )]
    pub fn transform<R: Rng + ?Sized>(
        &self,
        foreground: &RgbaImage,
        rng: &mut R,
    ) -> TransformedForeground {
        let p = &self.params;
        let scale = uniform(rng, p.scale_min, p.scale_max);
        let angle_deg = uniform(rng, p.angle_min_deg, p.angle_max_deg);
        Self::apply(foreground, scale, angle_deg)
    }

    /// Area-resize by `scale`, then rotate by `angle_deg` about the resized
    /// image's integer center on a canvas of the resized size. Pixels that
    /// come from outside the resized image are transparent black.
    pub fn apply(foreground: &RgbaImage, scale: f64, angle_deg: f64) -> TransformedForeground {
        let (w, h) = scaled_dimensions(foreground.width(), foreground.height(), scale);
        let resized = resize_area(foreground, w, h);
        let rotation = RotationTransform::about_center(w, h, angle_deg);
        let image = warp_rotation_rgba(&resized, &rotation);
        log::debug!(
            "transformed cut-out {}x{} -> {}x{} (scale {:.3}, angle {:.1} deg)",
            foreground.width(),
            foreground.height(),
            w,
            h,
            scale,
            angle_deg
        );
        TransformedForeground {
            image,
            scale,
            angle_deg,
            rotation,
        }
    }
}
