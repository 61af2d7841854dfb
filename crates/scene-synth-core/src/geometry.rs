use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, `[x, x + width) x [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box covering a whole `width x height` frame.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the box lies entirely inside a `width x height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }

    /// Shift the box into another frame whose origin sits at `(dx, dy)`.
    pub fn offset(&self, dx: u32, dy: u32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Geometric center in pixel units.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// Top-left offset of a foreground inside a background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

impl Placement {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Rectangle a `width x height` foreground covers when placed here.
    pub fn footprint(&self, width: u32, height: u32) -> BoundingBox {
        BoundingBox::new(self.x, self.y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_frame_fits_its_own_frame() {
        let b = BoundingBox::full_frame(64, 48);
        assert!(b.fits_within(64, 48));
        assert!(!b.fits_within(63, 48));
        assert_eq!(b.area(), 64 * 48);
    }

    #[test]
    fn offset_moves_origin_only() {
        let b = BoundingBox::new(3, 4, 10, 12).offset(100, 200);
        assert_eq!(b, BoundingBox::new(103, 204, 10, 12));
        assert_eq!(b.center(), (108.0, 210.0));
    }

    #[test]
    fn footprint_edges_are_exclusive() {
        let fp = Placement::new(90, 0).footprint(10, 5);
        assert_eq!(fp.right(), 100);
        assert!(fp.fits_within(100, 5));
        assert!(!fp.fits_within(99, 5));
    }
}
