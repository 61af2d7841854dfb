//! Normalized single-class detection labels.
//!
//! One label per file, one line per label:
//! `<class_id> <x_center> <y_center> <width> <height>`, all four values
//! relative to the background size.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use scene_synth_core::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::AnnotationError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct YoloAnnotation {
    pub class_id: u32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloAnnotation {
    /// Normalize a pixel box expressed in background coordinates.
    pub fn from_box(class_id: u32, bbox: &BoundingBox, bg_width: u32, bg_height: u32) -> Self {
        let bw = bg_width as f64;
        let bh = bg_height as f64;
        let (cx, cy) = bbox.center();
        Self {
            class_id,
            x_center: cx / bw,
            y_center: cy / bh,
            width: bbox.width as f64 / bw,
            height: bbox.height as f64 / bh,
        }
    }

    /// True when every normalized value lies in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [self.x_center, self.y_center, self.width, self.height]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }

    /// Overwrite `path` with this label as a single line.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), AnnotationError> {
        fs::write(path, format!("{self}\n"))?;
        Ok(())
    }
}

/// Shortest round-trip decimal, always with a fractional part (`1.0`, not `1`).
struct Fraction(f64);

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for YoloAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.class_id,
            Fraction(self.x_center),
            Fraction(self.y_center),
            Fraction(self.width),
            Fraction(self.height)
        )
    }
}

impl FromStr for YoloAnnotation {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || AnnotationError::Parse {
            line: s.to_string(),
        };
        let fields: Vec<&str> = s.split_whitespace().collect();
        let &[class_id, x_center, y_center, width, height] = fields.as_slice() else {
            return Err(parse_err());
        };
        let num = |v: &str| v.parse::<f64>().map_err(|_| parse_err());
        Ok(Self {
            class_id: class_id.parse().map_err(|_| parse_err())?,
            x_center: num(x_center)?,
            y_center: num(y_center)?,
            width: num(width)?,
            height: num(height)?,
        })
    }
}

/// Normalize `bbox` against the background size and write it to `path`.
pub fn write_annotation(
    path: impl AsRef<Path>,
    class_id: u32,
    bbox: &BoundingBox,
    bg_width: u32,
    bg_height: u32,
) -> Result<YoloAnnotation, AnnotationError> {
    let ann = YoloAnnotation::from_box(class_id, bbox, bg_width, bg_height);
    ann.write(path)?;
    Ok(ann)
}

/// Read the first label line of an annotation file.
pub fn read_annotation(path: impl AsRef<Path>) -> Result<YoloAnnotation, AnnotationError> {
    let raw = fs::read_to_string(path)?;
    let line = raw
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| AnnotationError::Parse { line: raw.clone() })?;
    line.parse()
}
