use image::RgbaImage;
use scene_synth_core::BoundingBox;

/// Tight axis-aligned box around every pixel with non-zero alpha.
///
/// A fully transparent image yields the full-frame box.
pub fn extract_bbox(foreground: &RgbaImage) -> BoundingBox {
    let (w, h) = foreground.dimensions();
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (x, y, px) in foreground.enumerate_pixels() {
        if px.0[3] > 0 {
            any = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !any {
        return BoundingBox::full_frame(w, h);
    }
    BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn transparent_image_gives_full_frame() {
        let fg = RgbaImage::new(13, 7);
        assert_eq!(extract_bbox(&fg), BoundingBox::full_frame(13, 7));
    }

    #[test]
    fn single_opaque_pixel_gives_unit_box() {
        let mut fg = RgbaImage::new(20, 20);
        fg.put_pixel(6, 11, Rgba([0, 0, 0, 1]));
        assert_eq!(extract_bbox(&fg), BoundingBox::new(6, 11, 1, 1));
    }

    #[test]
    fn box_spans_extreme_pixels() {
        let mut fg = RgbaImage::new(30, 30);
        fg.put_pixel(4, 20, Rgba([9, 9, 9, 255]));
        fg.put_pixel(25, 3, Rgba([9, 9, 9, 40]));
        fg.put_pixel(10, 10, Rgba([255, 255, 255, 0]));
        let b = extract_bbox(&fg);
        assert_eq!(b, BoundingBox::new(4, 3, 22, 18));
        assert!(b.fits_within(30, 30));
    }
}
