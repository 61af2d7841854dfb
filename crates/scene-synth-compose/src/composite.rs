use image::{Rgb, RgbImage, RgbaImage};
use scene_synth_core::{Mask, Placement};

use crate::ComposeError;

/// Paste `foreground` onto a copy of `background` with its top-left at `at`.
///
/// Every foreground pixel with non-zero alpha overwrites the background
/// pixel under it with its RGB value; zero-alpha pixels leave the
/// background untouched. Alpha is not used as a blend weight and the
/// result is opaque.
pub fn composite(
    background: &RgbImage,
    foreground: &RgbaImage,
    at: Placement,
) -> Result<RgbImage, ComposeError> {
    let (fw, fh) = foreground.dimensions();
    let (bw, bh) = background.dimensions();
    if !at.footprint(fw, fh).fits_within(bw, bh) {
        return Err(ComposeError::OutOfBounds {
            x: at.x,
            y: at.y,
            width: fw,
            height: fh,
            bg_width: bw,
            bg_height: bh,
        });
    }

    let mut out = background.clone();
    for (col, row, px) in foreground.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        if a > 0 {
            out.put_pixel(at.x + col, at.y + row, Rgb([r, g, b]));
        }
    }
    Ok(out)
}

/// Background with every non-placeable pixel blacked out.
///
/// Handy when tuning the HSV range for a new set of scenes.
pub fn preview_mask(background: &RgbImage, mask: &Mask) -> Result<RgbImage, ComposeError> {
    if mask.dimensions() != background.dimensions() {
        let (mask_width, mask_height) = mask.dimensions();
        return Err(ComposeError::MaskSizeMismatch {
            mask_width,
            mask_height,
            width: background.width(),
            height: background.height(),
        });
    }
    let mut out = background.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        if !mask.is_placeable(x, y) {
            *px = Rgb([0, 0, 0]);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb([x as u8, y as u8, 77]))
    }

    #[test]
    fn transparent_pixels_leave_background_untouched() {
        let bg = gradient(30, 20);
        let fg = RgbaImage::from_fn(6, 4, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 1])
            } else {
                Rgba([0, 255, 0, 0])
            }
        });
        let at = Placement::new(10, 5);
        let out = composite(&bg, &fg, at).expect("fits");

        for (x, y, px) in out.enumerate_pixels() {
            let inside = x >= 10 && x < 16 && y >= 5 && y < 9;
            let opaque = inside && fg.get_pixel(x - 10, y - 5).0[3] > 0;
            if opaque {
                assert_eq!(*px, Rgb([255, 0, 0]), "({x}, {y})");
            } else {
                assert_eq!(px, bg.get_pixel(x, y), "({x}, {y})");
            }
        }
    }

    #[test]
    fn input_background_is_not_modified() {
        let bg = gradient(8, 8);
        let before = bg.clone();
        let fg = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
        let out = composite(&bg, &fg, Placement::new(0, 0)).expect("fits");
        assert_eq!(bg, before);
        assert!(out.pixels().all(|p| *p == Rgb([1, 2, 3])));
    }

    #[test]
    fn out_of_bounds_footprint_is_rejected() {
        let bg = gradient(10, 10);
        let fg = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let err = composite(&bg, &fg, Placement::new(7, 0)).unwrap_err();
        assert!(matches!(err, ComposeError::OutOfBounds { x: 7, .. }));
    }

    #[test]
    fn preview_blacks_out_blocked_pixels() {
        let bg = RgbImage::from_pixel(4, 2, Rgb([9, 9, 9]));
        let mask = Mask::from_fn(4, 2, |x, _| x % 2 == 0);
        let out = preview_mask(&bg, &mask).expect("same size");
        assert_eq!(*out.get_pixel(0, 1), Rgb([9, 9, 9]));
        assert_eq!(*out.get_pixel(1, 1), Rgb([0, 0, 0]));
        assert!(preview_mask(&bg, &Mask::filled(3, 2, true)).is_err());
    }
}
