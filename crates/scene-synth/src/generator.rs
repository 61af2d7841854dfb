//! Batch orchestration.

use std::any::Any;
use std::fs;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use image::{RgbImage, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_synth_compose::{
    composite, extract_bbox, preview_mask, PlacementResult, PlacementSampler, RegionDetector,
    TransformedForeground, Transformer, YoloAnnotation,
};
use scene_synth_core::{BoundingBox, Mask, Placement};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    list_images, DatasetError, FailureKind, GeneratorParams, ItemError, ProgressEvent,
    ProgressSink, SceneError, WriterSink,
};

/// Source and destination folders of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    pub backgrounds_dir: PathBuf,
    pub foregrounds_dir: PathBuf,
    pub images_dir: PathBuf,
    pub annotations_dir: PathBuf,
}

impl DatasetLayout {
    pub fn new(
        backgrounds_dir: impl Into<PathBuf>,
        foregrounds_dir: impl Into<PathBuf>,
        images_dir: impl Into<PathBuf>,
        annotations_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backgrounds_dir: backgrounds_dir.into(),
            foregrounds_dir: foregrounds_dir.into(),
            images_dir: images_dir.into(),
            annotations_dir: annotations_dir.into(),
        }
    }
}

/// One composed scene, still in memory.
#[derive(Clone, Debug)]
pub struct SyntheticScene {
    pub image: RgbImage,
    pub mask: Mask,
    pub foreground: TransformedForeground,
    pub placement: Placement,
    /// Tight object box in background pixel coordinates.
    pub object_box: BoundingBox,
}

/// A sample written to disk.
#[derive(Clone, Debug)]
pub struct GeneratedItem {
    pub index: usize,
    pub image_path: PathBuf,
    pub annotation_path: PathBuf,
    pub annotation: YoloAnnotation,
    pub placement: Placement,
}

/// Per-run tally, one entry per attempted item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub requested: usize,
    pub generated: usize,
    pub load_failures: usize,
    pub placement_failures: usize,
    pub save_failures: usize,
    pub other_failures: usize,
}

impl GenerationSummary {
    fn record_failure(&mut self, kind: FailureKind) {
        match kind {
            FailureKind::Load => self.load_failures += 1,
            FailureKind::NoPlacement => self.placement_failures += 1,
            FailureKind::Persist => self.save_failures += 1,
            FailureKind::Unexpected => self.other_failures += 1,
        }
    }

    pub fn failed(&self) -> usize {
        self.load_failures + self.placement_failures + self.save_failures + self.other_failures
    }
}

/// Drives the detect -> transform -> place -> composite -> label pipeline
/// over a batch.
#[derive(Clone, Debug)]
pub struct DatasetGenerator {
    params: GeneratorParams,
    detector: RegionDetector,
    transformer: Transformer,
    sampler: PlacementSampler,
}

impl Default for DatasetGenerator {
    fn default() -> Self {
        Self::new(GeneratorParams::default())
    }
}

impl DatasetGenerator {
    pub fn new(params: GeneratorParams) -> Self {
        Self {
            detector: RegionDetector::new(params.region.clone()),
            transformer: Transformer::new(params.transform.clone()),
            sampler: PlacementSampler::new(params.placement.clone()),
            params,
        }
    }

    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Generate `count` samples with an RNG seeded from `params.seed`, or
    /// from the OS when no seed is set.
    pub fn generate(
        &self,
        layout: &DatasetLayout,
        count: usize,
        sink: &mut dyn ProgressSink,
    ) -> Result<GenerationSummary, DatasetError> {
        let mut rng = match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.generate_with_rng(layout, count, &mut rng, sink)
    }

    /// Generate `count` samples, indices `1..=count`.
    ///
    /// Folder listing and output folder creation happen first and are the
    /// only failures returned as `Err`. After that every index is attempted
    /// and produces exactly one event on `sink`; a panic inside one item is
    /// reported as an `Unexpected` failure of that item.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, layout, rng, sink))
    )]
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        layout: &DatasetLayout,
        count: usize,
        rng: &mut R,
        sink: &mut dyn ProgressSink,
    ) -> Result<GenerationSummary, DatasetError> {
        let sources = &self.params.sources;
        let backgrounds = list_images(&layout.backgrounds_dir, &sources.background_extensions)?;
        let foregrounds = list_images(&layout.foregrounds_dir, &sources.foreground_extensions)?;
        if backgrounds.is_empty() {
            return Err(DatasetError::NoBackgrounds {
                dir: layout.backgrounds_dir.clone(),
            });
        }
        if foregrounds.is_empty() {
            return Err(DatasetError::NoForegrounds {
                dir: layout.foregrounds_dir.clone(),
            });
        }

        let mut out_dirs = vec![&layout.images_dir, &layout.annotations_dir];
        if let Some(dir) = &self.params.mask_preview_dir {
            out_dirs.push(dir);
        }
        for dir in out_dirs {
            fs::create_dir_all(dir).map_err(|source| DatasetError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }

        log::info!(
            "generating {} samples from {} backgrounds x {} cut-outs",
            count,
            backgrounds.len(),
            foregrounds.len()
        );

        let mut summary = GenerationSummary {
            requested: count,
            ..GenerationSummary::default()
        };

        for index in 1..=count {
            let background = &backgrounds[rng.random_range(0..backgrounds.len())];
            let foreground = &foregrounds[rng.random_range(0..foregrounds.len())];

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.generate_one(index, background, foreground, layout, rng)
            }))
            .unwrap_or_else(|payload| {
                Err(ItemError::Panicked {
                    message: panic_message(payload.as_ref()),
                })
            });

            let event = match outcome {
                Ok(item) => {
                    summary.generated += 1;
                    ProgressEvent::Generated {
                        index,
                        image: item.image_path,
                        annotation: item.annotation_path,
                    }
                }
                Err(err) => {
                    let kind = err.kind();
                    summary.record_failure(kind);
                    ProgressEvent::Failed {
                        index,
                        kind,
                        message: err.to_string(),
                    }
                }
            };
            sink.report(&event);
        }

        log::info!(
            "generated {} of {} samples ({} failed)",
            summary.generated,
            summary.requested,
            summary.failed()
        );
        Ok(summary)
    }

    /// Load one background/cut-out pair, compose it and write the image and
    /// its label under `index`.
    pub fn generate_one<R: Rng + ?Sized>(
        &self,
        index: usize,
        background_path: &Path,
        foreground_path: &Path,
        layout: &DatasetLayout,
        rng: &mut R,
    ) -> Result<GeneratedItem, ItemError> {
        let background = image::open(background_path)
            .map_err(|source| ItemError::LoadBackground {
                path: background_path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        let foreground = image::open(foreground_path)
            .map_err(|source| ItemError::LoadForeground {
                path: foreground_path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let scene = self
            .compose_scene(&background, &foreground, rng)
            .map_err(|source| ItemError::Scene {
                background: background_path.to_path_buf(),
                source,
            })?;

        let output = &self.params.output;
        let image_path = layout.images_dir.join(output.image_file_name(index));
        scene
            .image
            .save(&image_path)
            .map_err(|source| ItemError::SaveImage {
                path: image_path.clone(),
                source,
            })?;

        if let Some(dir) = &self.params.mask_preview_dir {
            self.write_mask_preview(dir, index, &background, &scene.mask);
        }

        let annotation_path = layout.annotations_dir.join(output.annotation_file_name(index));
        let annotation = YoloAnnotation::from_box(
            output.class_id,
            &scene.object_box,
            background.width(),
            background.height(),
        );
        annotation
            .write(&annotation_path)
            .map_err(|source| ItemError::Annotation {
                path: annotation_path.clone(),
                source,
            })?;

        Ok(GeneratedItem {
            index,
            image_path,
            annotation_path,
            annotation,
            placement: scene.placement,
        })
    }

    /// In-memory part of one sample: region mask, transformed cut-out,
    /// placement, composite and object box.
    pub fn compose_scene<R: Rng + ?Sized>(
        &self,
        background: &RgbImage,
        foreground: &RgbaImage,
        rng: &mut R,
    ) -> Result<SyntheticScene, SceneError> {
        let mask = self.detector.detect(background);
        let transformed = self.transformer.transform(foreground, rng);

        let placement = match self.sampler.sample(
            background.dimensions(),
            transformed.dimensions(),
            &mask,
            rng,
        ) {
            PlacementResult::Placed { placement, .. } => placement,
            PlacementResult::NotFound { attempts } => {
                return Err(SceneError::NoPlacement { attempts });
            }
        };

        let image = composite(background, &transformed.image, placement)?;
        let object_box = extract_bbox(&transformed.image).offset(placement.x, placement.y);

        Ok(SyntheticScene {
            image,
            mask,
            foreground: transformed,
            placement,
            object_box,
        })
    }

    fn write_mask_preview(&self, dir: &Path, index: usize, background: &RgbImage, mask: &Mask) {
        let path = dir.join(format!("{}_mask.png", self.params.output.stem(index)));
        let result = preview_mask(background, mask)
            .map_err(|e| e.to_string())
            .and_then(|img| img.save(&path).map_err(|e| e.to_string()));
        if let Err(err) = result {
            log::warn!("mask preview {} not written: {err}", path.display());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run a batch with default parameters and an OS-seeded RNG.
///
/// Passing `None` as the sink prints one status line per item to stdout.
pub fn generate(
    backgrounds_dir: impl AsRef<Path>,
    foregrounds_dir: impl AsRef<Path>,
    output_image_dir: impl AsRef<Path>,
    output_annotation_dir: impl AsRef<Path>,
    count: usize,
    sink: Option<&mut dyn ProgressSink>,
) -> Result<GenerationSummary, DatasetError> {
    let layout = DatasetLayout::new(
        backgrounds_dir.as_ref(),
        foregrounds_dir.as_ref(),
        output_image_dir.as_ref(),
        output_annotation_dir.as_ref(),
    );
    generate_or_print(&layout, count, sink, io::stdout()).map(|(summary, _)| summary)
}

/// `generate` with the fallback stream as a parameter. Returns the stream
/// so callers can inspect what was printed.
fn generate_or_print<W: Write>(
    layout: &DatasetLayout,
    count: usize,
    sink: Option<&mut dyn ProgressSink>,
    fallback: W,
) -> Result<(GenerationSummary, W), DatasetError> {
    let generator = DatasetGenerator::default();
    match sink {
        Some(sink) => Ok((generator.generate(layout, count, sink)?, fallback)),
        None => {
            let mut printer = WriterSink::new(fallback);
            let summary = generator.generate(layout, count, &mut printer)?;
            Ok((summary, printer.into_inner()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    const WATER: Rgb<u8> = Rgb([20, 40, 60]);
    const SHORE: Rgb<u8> = Rgb([230, 230, 225]);

    fn lake(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |_, y| if y >= h / 3 { WATER } else { SHORE })
    }

    fn disc(side: u32) -> RgbaImage {
        let r = side as f64 / 2.0;
        RgbaImage::from_fn(side, side, |x, y| {
            let dx = x as f64 + 0.5 - r;
            let dy = y as f64 + 0.5 - r;
            if dx * dx + dy * dy <= r * r {
                Rgba([250, 30, 30, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    #[test]
    fn scene_box_lies_inside_footprint_and_background() {
        let generator = DatasetGenerator::default();
        let bg = lake(160, 120);
        let fg = disc(40);
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..10 {
            let scene = generator.compose_scene(&bg, &fg, &mut rng).expect("placeable");
            let (fw, fh) = scene.foreground.dimensions();
            let footprint = scene.placement.footprint(fw, fh);
            assert!(footprint.fits_within(160, 120));
            let b = scene.object_box;
            assert!(b.x >= footprint.x && b.right() <= footprint.right());
            assert!(b.y >= footprint.y && b.bottom() <= footprint.bottom());
            assert_eq!(scene.image.dimensions(), bg.dimensions());
        }
    }

    #[test]
    fn pixels_outside_the_object_are_untouched() {
        let generator = DatasetGenerator::default();
        let bg = lake(100, 90);
        let scene = generator
            .compose_scene(&bg, &disc(30), &mut StdRng::seed_from_u64(4))
            .expect("placeable");
        let p = scene.placement;
        for (x, y, px) in scene.image.enumerate_pixels() {
            let local = x
                .checked_sub(p.x)
                .zip(y.checked_sub(p.y))
                .and_then(|(lx, ly)| scene.foreground.image.get_pixel_checked(lx, ly));
            match local {
                Some(fg_px) if fg_px.0[3] > 0 => {
                    assert_eq!(px.0, [fg_px.0[0], fg_px.0[1], fg_px.0[2]])
                }
                _ => assert_eq!(px, bg.get_pixel(x, y), "({x}, {y})"),
            }
        }
    }

    #[test]
    fn dry_background_reports_no_placement() {
        let generator = DatasetGenerator::default();
        let bg = RgbImage::from_pixel(50, 50, SHORE);
        let err = generator
            .compose_scene(&bg, &disc(10), &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, SceneError::NoPlacement { attempts: 0 }));
    }

    #[test]
    fn missing_sink_prints_one_line_per_item() {
        let root = tempfile::tempdir().expect("tempdir");
        let layout = DatasetLayout::new(
            root.path().join("bg"),
            root.path().join("fg"),
            root.path().join("out"),
            root.path().join("ann"),
        );
        fs::create_dir_all(&layout.backgrounds_dir).expect("mkdir");
        fs::create_dir_all(&layout.foregrounds_dir).expect("mkdir");
        lake(90, 60)
            .save(layout.backgrounds_dir.join("lake.png"))
            .expect("save bg");
        disc(16)
            .save(layout.foregrounds_dir.join("buoy.png"))
            .expect("save fg");

        let (summary, printed) =
            generate_or_print(&layout, 3, None, Vec::new()).expect("run");
        let text = String::from_utf8(printed).expect("utf8");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(summary.requested, 3);
        assert_eq!(lines.len(), 3, "{text}");
        for (i, line) in lines.iter().enumerate() {
            assert!(line.starts_with(&format!("[{}] ", i + 1)), "{line}");
        }
    }

    #[test]
    fn panic_payloads_become_messages() {
        let caught = panic::catch_unwind(|| panic!("range is empty")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "range is empty");
        let caught = panic::catch_unwind(|| panic!("{} attempts", 3)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "3 attempts");
        let caught = panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "non-string panic payload");
    }

    #[test]
    fn summary_tallies_by_kind() {
        let mut s = GenerationSummary::default();
        s.record_failure(FailureKind::Load);
        s.record_failure(FailureKind::Load);
        s.record_failure(FailureKind::NoPlacement);
        assert_eq!(s.load_failures, 2);
        assert_eq!(s.failed(), 3);
    }
}
