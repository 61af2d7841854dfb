use image::{GrayImage, Luma};

use crate::BoundingBox;

/// Binary placement mask with the same dimensions as its source image.
///
/// Backed by a `GrayImage` holding `0` (not placeable) or `255`
/// (placeable) so it can go straight through `imageproc` morphology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    gray: GrayImage,
}

impl Mask {
    pub const PLACEABLE: u8 = 255;
    pub const BLOCKED: u8 = 0;

    /// Wrap a grayscale image; any non-zero pixel counts as placeable.
    pub fn from_gray(mut gray: GrayImage) -> Self {
        for p in gray.pixels_mut() {
            if p.0[0] != 0 {
                p.0[0] = Self::PLACEABLE;
            }
        }
        Self { gray }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let gray = GrayImage::from_fn(width, height, |x, y| {
            Luma([if f(x, y) {
                Self::PLACEABLE
            } else {
                Self::BLOCKED
            }])
        });
        Self { gray }
    }

    /// Mask with every pixel set to `placeable`.
    pub fn filled(width: u32, height: u32, placeable: bool) -> Self {
        Self::from_fn(width, height, |_, _| placeable)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.gray.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }

    /// Out-of-range coordinates are never placeable.
    #[inline]
    pub fn is_placeable(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.gray.get_pixel(x, y).0[0] != 0
    }

    pub fn count_placeable(&self) -> usize {
        self.gray.as_raw().iter().filter(|&&v| v != 0).count()
    }

    /// Row-major linear indices (`y * width + x`) of every placeable pixel.
    pub fn placeable_indices(&self) -> Vec<u32> {
        self.gray
            .as_raw()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0)
            .map(|(i, _)| i as u32)
            .collect()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.gray
    }
}

/// Summed-area table over a [`Mask`] for constant-time region counts.
///
/// Stored with one row and one column of zero padding, so entry
/// `(x, y)` holds the count over `[0, x) x [0, y)`.
#[derive(Clone, Debug)]
pub struct PlaceableIntegral {
    width: u32,
    height: u32,
    sums: Vec<u64>,
}

impl PlaceableIntegral {
    pub fn new(mask: &Mask) -> Self {
        let (w, h) = mask.dimensions();
        let stride = w as usize + 1;
        let mut sums = vec![0u64; stride * (h as usize + 1)];
        let raw = mask.as_gray().as_raw();
        for y in 0..h as usize {
            let mut row = 0u64;
            for x in 0..w as usize {
                row += (raw[y * w as usize + x] != 0) as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self {
            width: w,
            height: h,
            sums,
        }
    }

    /// Placeable pixel count inside `rect`, clipped to the mask.
    pub fn count_in(&self, rect: &BoundingBox) -> u64 {
        let x0 = (rect.x.min(self.width)) as usize;
        let y0 = (rect.y.min(self.height)) as usize;
        let x1 = rect.right().min(self.width as u64) as usize;
        let y1 = rect.bottom().min(self.height as u64) as usize;
        let stride = self.width as usize + 1;
        let at = |x: usize, y: usize| self.sums[y * stride + x];
        at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> Mask {
        Mask::from_fn(width, height, |x, y| (x / 3 + y / 2) % 2 == 0)
    }

    fn brute_count(mask: &Mask, rect: &BoundingBox) -> u64 {
        let mut n = 0;
        for y in rect.y as u64..rect.bottom() {
            for x in rect.x as u64..rect.right() {
                if mask.is_placeable(x as u32, y as u32) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn from_gray_binarizes() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([x as u8 * 40]));
        let mask = Mask::from_gray(gray);
        assert_eq!(mask.as_gray().as_raw(), &vec![0, 255, 255, 255]);
        assert_eq!(mask.count_placeable(), 3);
    }

    #[test]
    fn placeable_indices_are_row_major() {
        let mask = Mask::from_fn(3, 2, |x, y| x == y);
        assert_eq!(mask.placeable_indices(), vec![0, 4]);
        assert!(!mask.is_placeable(5, 0));
    }

    #[test]
    fn integral_matches_direct_count() {
        let mask = checker(17, 11);
        let integral = PlaceableIntegral::new(&mask);
        assert_eq!(
            integral.count_in(&BoundingBox::full_frame(17, 11)),
            mask.count_placeable() as u64
        );
        for rect in [
            BoundingBox::new(0, 0, 5, 5),
            BoundingBox::new(2, 3, 7, 4),
            BoundingBox::new(10, 6, 20, 20),
            BoundingBox::new(16, 10, 1, 1),
            BoundingBox::new(4, 4, 0, 3),
        ] {
            assert_eq!(integral.count_in(&rect), brute_count(&mask, &rect), "rect {rect:?}");
        }
    }
}
