use std::path::{Path, PathBuf};

use scene_synth_compose::{PlacementParams, RegionParams, TransformParams};
use serde::{Deserialize, Serialize};

/// Naming and labelling of generated samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputParams {
    /// File stem prefix, followed by `_` and the zero-padded index.
    pub prefix: String,
    /// Extension of generated images; also selects the encoder.
    pub image_extension: String,
    /// Minimal number of digits in the index.
    pub index_width: usize,
    /// Class id written into every label.
    pub class_id: u32,
}

impl Default for OutputParams {
    fn default() -> Self {
        Self {
            prefix: "synthetic_image".to_string(),
            image_extension: "jpg".to_string(),
            index_width: 3,
            class_id: 0,
        }
    }
}

impl OutputParams {
    /// `synthetic_image_007` for index 7 with the defaults.
    pub fn stem(&self, index: usize) -> String {
        format!("{}_{:0width$}", self.prefix, index, width = self.index_width)
    }

    pub fn image_file_name(&self, index: usize) -> String {
        format!("{}.{}", self.stem(index), self.image_extension)
    }

    pub fn annotation_file_name(&self, index: usize) -> String {
        format!("{}.txt", self.stem(index))
    }
}

/// Which files in the source folders count as images.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFilter {
    /// Matched case-insensitively, without the leading dot.
    pub background_extensions: Vec<String>,
    /// Cut-outs need an alpha channel, so only lossless RGBA formats.
    pub foreground_extensions: Vec<String>,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            background_extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            foreground_extensions: vec!["png".into()],
        }
    }
}

pub(crate) fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// All knobs of a generation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    pub region: RegionParams,
    pub transform: TransformParams,
    pub placement: PlacementParams,
    pub output: OutputParams,
    pub sources: SourceFilter,
    /// Seed for every random draw of the run; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// When set, a masked copy of each used background is written here
    /// as `<stem>_mask.png`.
    pub mask_preview_dir: Option<PathBuf>,
}
