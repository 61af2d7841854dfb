//! Area-averaging resize for 8-bit images.
//!
//! Each destination pixel is the coverage-weighted mean of the source
//! pixels its footprint overlaps.

use image::{ImageBuffer, Pixel};

/// Dimensions after scaling by `scale`, truncated and clamped to at least 1.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let w = ((width as f64) * scale).floor().max(1.0) as u32;
    let h = ((height as f64) * scale).floor().max(1.0) as u32;
    (w, h)
}

/// Source indices and overlap weights covered by destination cell `d`.
fn area_span(d: u32, ratio: f64, limit: u32) -> Vec<(u32, f64)> {
    let start = d as f64 * ratio;
    let end = ((d + 1) as f64 * ratio).min(limit as f64);
    let mut span = Vec::with_capacity(ratio.ceil() as usize + 1);
    let mut i = start.floor() as u32;
    while i < limit && (i as f64) < end {
        let lo = start.max(i as f64);
        let hi = end.min(i as f64 + 1.0);
        let w = hi - lo;
        if w > 1e-9 {
            span.push((i, w));
        }
        i += 1;
    }
    // Upscaling can leave a cell whose window starts past the last pixel.
    if span.is_empty() && limit > 0 {
        span.push(((start.floor() as u32).min(limit - 1), 1.0));
    }
    span
}

/// Resize `src` to `width x height` with area averaging.
///
/// Channels are averaged independently, alpha included, so transparent
/// borders blend into partially transparent edges the same way color does.
pub fn resize_area<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (sw, sh) = src.dimensions();
    if width == 0 || height == 0 || sw == 0 || sh == 0 {
        return ImageBuffer::new(width, height);
    }
    if (sw, sh) == (width, height) {
        return src.clone();
    }

    let ch = P::CHANNEL_COUNT as usize;
    let rx = sw as f64 / width as f64;
    let ry = sh as f64 / height as f64;
    let x_spans: Vec<_> = (0..width).map(|dx| area_span(dx, rx, sw)).collect();
    let y_spans: Vec<_> = (0..height).map(|dy| area_span(dy, ry, sh)).collect();

    let raw = src.as_raw();
    let mut out = vec![0u8; width as usize * height as usize * ch];
    let mut acc = vec![0f64; ch];

    for (dy, ys) in y_spans.iter().enumerate() {
        for (dx, xs) in x_spans.iter().enumerate() {
            acc.iter_mut().for_each(|a| *a = 0.0);
            let mut total = 0.0;
            for &(sy, wy) in ys {
                let row = sy as usize * sw as usize;
                for &(sx, wx) in xs {
                    let w = wx * wy;
                    let base = (row + sx as usize) * ch;
                    for c in 0..ch {
                        acc[c] += w * raw[base + c] as f64;
                    }
                    total += w;
                }
            }
            let base = (dy * width as usize + dx) * ch;
            for c in 0..ch {
                out[base + c] = (acc[c] / total).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    // Buffer length is exactly width * height * channels.
    ImageBuffer::from_raw(width, height, out).unwrap_or_else(|| ImageBuffer::new(width, height))
}
