use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate, Interpolation};
use nalgebra::{Matrix3, Point2, Vector3};

/// Fully transparent black, used for everything outside a source image.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Rotation about a fixed pixel center, stored as a 3x3 affine matrix.
///
/// The forward matrix maps source pixel coordinates to destination pixel
/// coordinates. Positive angles turn the content counter-clockwise as
/// displayed (y axis pointing down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationTransform {
    pub angle_deg: f64,
    pub center: Point2<f64>,
    m: Matrix3<f64>,
}

impl RotationTransform {
    pub fn new(center: Point2<f64>, angle_deg: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let (cx, cy) = (center.x, center.y);
        let m = Matrix3::new(
            cos,
            sin,
            (1.0 - cos) * cx - sin * cy, //
            -sin,
            cos,
            sin * cx + (1.0 - cos) * cy, //
            0.0,
            0.0,
            1.0,
        );
        Self {
            angle_deg,
            center,
            m,
        }
    }

    /// Rotation about the integer center `(width / 2, height / 2)`.
    pub fn about_center(width: u32, height: u32, angle_deg: f64) -> Self {
        Self::new(
            Point2::new((width / 2) as f64, (height / 2) as f64),
            angle_deg,
        )
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        self.m
    }

    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.m * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0], v[1])
    }

    /// Same center, opposite angle.
    pub fn inverse(&self) -> Self {
        Self::new(self.center, -self.angle_deg)
    }

    /// Source coordinate that lands on destination pixel `(x, y)`.
    #[inline]
    pub fn source_of(&self, x: u32, y: u32) -> Point2<f64> {
        self.inverse().apply(Point2::new(x as f64, y as f64))
    }
}

/// Rotate an RGBA image onto a canvas of the same size.
///
/// Bilinear, filled with [`TRANSPARENT`] wherever the source does not
/// cover the destination pixel. Corners that rotate off the canvas are
/// dropped.
pub fn warp_rotation_rgba(src: &RgbaImage, rot: &RotationTransform) -> RgbaImage {
    // imageproc turns clockwise as displayed for positive theta.
    let theta = -rot.angle_deg.to_radians() as f32;
    let center = (rot.center.x as f32, rot.center.y as f32);
    rotate(src, center, theta, Interpolation::Bilinear, TRANSPARENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn inverse_round_trips_points() {
        let rot = RotationTransform::about_center(41, 27, 33.0);
        for p in [
            Point2::new(0.0, 0.0),
            Point2::new(40.0, 26.0),
            Point2::new(-5.0, 12.5),
        ] {
            let back = rot.inverse().apply(rot.apply(p));
            assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn center_is_fixed() {
        let rot = RotationTransform::about_center(10, 7, 123.0);
        let c = rot.apply(Point2::new(5.0, 3.0));
        assert_relative_eq!(c.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn quarter_turn_moves_right_neighbour_up() {
        let rot = RotationTransform::about_center(11, 11, 90.0);
        let p = rot.apply(Point2::new(6.0, 5.0));
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn warp_turns_the_same_way_as_the_matrix() {
        // 3x3 opaque block centred at (7, 5); a quarter turn about (5, 5)
        // carries its centre to (5, 3).
        let src = RgbaImage::from_fn(11, 11, |x, y| {
            if (6..=8).contains(&x) && (4..=6).contains(&y) {
                Rgba([255, 255, 255, 255])
            } else {
                TRANSPARENT
            }
        });
        let rot = RotationTransform::about_center(11, 11, 90.0);
        let out = warp_rotation_rgba(&src, &rot);
        assert_eq!(out.dimensions(), (11, 11));
        assert_eq!(out.get_pixel(5, 3).0[3], 255);
        assert_eq!(out.get_pixel(5, 7).0[3], 0);
        assert_eq!(out.get_pixel(7, 5).0[3], 0);
    }

    #[test]
    fn rotated_corners_become_transparent() {
        let src = RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 255]));
        let out = warp_rotation_rgba(&src, &RotationTransform::about_center(20, 20, 45.0));
        assert_eq!(out.dimensions(), (20, 20));
        assert_eq!(*out.get_pixel(0, 0), TRANSPARENT);
        assert_eq!(*out.get_pixel(19, 19), TRANSPARENT);
        assert_eq!(out.get_pixel(10, 10).0[3], 255);
    }
}
