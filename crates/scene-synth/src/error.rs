use std::path::PathBuf;

use scene_synth_compose::{AnnotationError, ComposeError};
use serde::{Deserialize, Serialize};

/// Coarse failure class of one generation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// A source image could not be read or decoded.
    Load,
    /// The placement search ran out of attempts.
    NoPlacement,
    /// The generated image could not be written.
    Persist,
    /// Anything else that went wrong inside the iteration.
    Unexpected,
}

/// Errors from composing one scene in memory.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("no valid placement after {attempts} attempts")]
    NoPlacement { attempts: u32 },
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Errors from one generation attempt. None of these abort a batch.
#[derive(thiserror::Error, Debug)]
pub enum ItemError {
    #[error("cannot load background {}: {source}", .path.display())]
    LoadBackground {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("cannot load foreground {}: {source}", .path.display())]
    LoadForeground {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{}: {source}", .background.display())]
    Scene {
        background: PathBuf,
        source: SceneError,
    },
    #[error("cannot save {}: {source}", .path.display())]
    SaveImage {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("cannot write annotation {}: {source}", .path.display())]
    Annotation {
        path: PathBuf,
        source: AnnotationError,
    },
    #[error("item panicked: {message}")]
    Panicked { message: String },
}

impl ItemError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::LoadBackground { .. } | Self::LoadForeground { .. } => FailureKind::Load,
            Self::Scene {
                source: SceneError::NoPlacement { .. },
                ..
            } => FailureKind::NoPlacement,
            Self::SaveImage { .. } => FailureKind::Persist,
            Self::Scene { .. } | Self::Annotation { .. } | Self::Panicked { .. } => {
                FailureKind::Unexpected
            }
        }
    }
}

/// Batch-level errors, raised before any item is attempted.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("cannot read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no background images in {}", .dir.display())]
    NoBackgrounds { dir: PathBuf },
    #[error("no foreground cut-outs in {}", .dir.display())]
    NoForegrounds { dir: PathBuf },
}
