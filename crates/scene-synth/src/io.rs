//! JSON run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{DatasetLayout, GeneratorParams};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Everything a batch run needs: the four folders, the item count and
/// optional parameter overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    pub backgrounds_dir: PathBuf,
    pub foregrounds_dir: PathBuf,
    pub images_dir: PathBuf,
    pub annotations_dir: PathBuf,
    pub count: usize,
    #[serde(default)]
    pub params: GeneratorParams,
}

impl GenerateConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn layout(&self) -> DatasetLayout {
        DatasetLayout::new(
            &self.backgrounds_dir,
            &self.foregrounds_dir,
            &self.images_dir,
            &self.annotations_dir,
        )
    }
}
