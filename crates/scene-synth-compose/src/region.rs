//! Placeable-surface segmentation.
//!
//! A pixel is placeable when its HSV triple falls inside a fixed inclusive
//! range. The raw mask is cleaned with a closing (fills pin-holes inside
//! the surface) followed by an opening (drops isolated speckles), both
//! with the same square structuring element.

use image::{GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};
use scene_synth_core::Mask;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Convert one RGB pixel to 8-bit HSV.
///
/// Hue is in half-degrees (`0..=179`), saturation and value in `0..=255`,
/// matching the common 8-bit HSV convention used when the range constants
/// were tuned.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(i32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 { 0 } else { (255 * diff + v / 2) / v };
    if diff == 0 {
        return [0, s as u8, v as u8];
    }

    let sector = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    // 60 degrees per sector is 30 half-degrees.
    let mut h = (30.0 * sector as f64 / diff as f64).round() as i32;
    if h < 0 {
        h += 180;
    }
    if h >= 180 {
        h -= 180;
    }
    [h as u8, s as u8, v as u8]
}

/// Inclusive HSV box, `lower[i] <= hsv[i] <= upper[i]` on every channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    /// Dark and blue surfaces such as open water.
    pub const WATER: Self = Self {
        lower: [0, 0, 0],
        upper: [110, 255, 220],
    };

    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= hsv[i] && hsv[i] <= self.upper[i])
    }
}

impl Default for HsvRange {
    fn default() -> Self {
        Self::WATER
    }
}

/// Parameters for [`RegionDetector`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionParams {
    /// Color range classified as placeable. Scene dependent.
    pub hsv: HsvRange,
    /// Structuring element radius under the L-infinity norm; `2` is a 5x5
    /// square. `0` disables the morphological cleanup.
    pub kernel_radius: u8,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            hsv: HsvRange::WATER,
            kernel_radius: 2,
        }
    }
}

/// Classifies background pixels as placeable surface.
#[derive(Clone, Debug, Default)]
pub struct RegionDetector {
    params: RegionParams,
}

impl RegionDetector {
    pub fn new(params: RegionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RegionParams {
        &self.params
    }

    /// Thresholded mask before morphology.
    pub fn raw_mask(&self, background: &RgbImage) -> Mask {
        let range = self.params.hsv;
        let gray = GrayImage::from_fn(background.width(), background.height(), |x, y| {
            let hsv = rgb_to_hsv(background.get_pixel(x, y).0);
            Luma([if range.contains(hsv) {
                Mask::PLACEABLE
            } else {
                Mask::BLOCKED
            }])
        });
        Mask::from_gray(gray)
    }

    /// Placeable mask: threshold, then closing, then opening.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, background), fields(width = background.width(), height = background.height()))
    )]
    pub fn detect(&self, background: &RgbImage) -> Mask {
        let raw = self.raw_mask(background);
        let k = self.params.kernel_radius;
        if k == 0 {
            return raw;
        }
        let closed = close(raw.as_gray(), Norm::LInf, k);
        let opened = open(&closed, Norm::LInf, k);
        let mask = Mask::from_gray(opened);
        log::debug!(
            "region mask: {} raw -> {} cleaned placeable px of {}",
            raw.count_placeable(),
            mask.count_placeable(),
            background.width() as u64 * background.height() as u64
        );
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WATER: Rgb<u8> = Rgb([20, 40, 60]);
    const SKY: Rgb<u8> = Rgb([250, 250, 250]);

    #[test]
    fn hsv_primaries() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn hsv_wraps_near_red() {
        assert_eq!(rgb_to_hsv([255, 0, 10])[0], 179);
        assert_eq!(rgb_to_hsv([255, 0, 1])[0], 0);
    }

    #[test]
    fn water_range_accepts_dark_blue_and_rejects_bright() {
        let range = HsvRange::WATER;
        assert!(range.contains(rgb_to_hsv(WATER.0)));
        assert!(!range.contains(rgb_to_hsv(SKY.0)));
        // Saturated pure blue sits at hue 120, outside the tuned band.
        assert!(!range.contains(rgb_to_hsv([0, 0, 200])));
    }

    #[test]
    fn half_water_scene_masks_the_water_half() {
        let bg = RgbImage::from_fn(40, 30, |x, _| if x < 20 { WATER } else { SKY });
        let mask = RegionDetector::default().detect(&bg);
        assert_eq!(mask.dimensions(), (40, 30));
        for y in 0..30 {
            for x in 0..40 {
                assert_eq!(mask.is_placeable(x, y), x < 20, "({x}, {y})");
            }
        }
    }

    #[test]
    fn closing_fills_pinholes_and_opening_drops_speckles() {
        let bg = RgbImage::from_fn(60, 30, |x, y| {
            let in_water = x < 30;
            let pinhole = (x, y) == (12, 14);
            let speckle = (x, y) == (45, 15);
            if (in_water && !pinhole) || speckle {
                WATER
            } else {
                SKY
            }
        });
        let detector = RegionDetector::default();
        let raw = detector.raw_mask(&bg);
        assert!(!raw.is_placeable(12, 14));
        assert!(raw.is_placeable(45, 15));

        let mask = detector.detect(&bg);
        assert!(mask.is_placeable(12, 14));
        assert!(!mask.is_placeable(45, 15));
    }

    #[test]
    fn detection_is_deterministic() {
        let bg = RgbImage::from_fn(33, 21, |x, y| {
            Rgb([(x * 7) as u8, (y * 11) as u8, ((x + y) * 5) as u8])
        });
        let detector = RegionDetector::default();
        assert_eq!(detector.detect(&bg), detector.detect(&bg));
    }

    #[test]
    fn no_matching_pixels_gives_empty_mask() {
        let bg = RgbImage::from_pixel(16, 16, SKY);
        assert_eq!(RegionDetector::default().detect(&bg).count_placeable(), 0);
    }
}
