use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::params::has_extension;
use crate::{DatasetError, DatasetLayout, OutputParams, SourceFilter};

/// Files in `dir` whose extension is in `extensions`, sorted by path.
pub fn list_images(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, DatasetError> {
    let entries = fs::read_dir(dir).map_err(|source| DatasetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DatasetError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn count_or_zero(dir: &Path, extensions: &[String]) -> Result<usize, DatasetError> {
    if !dir.is_dir() {
        return Ok(0);
    }
    Ok(list_images(dir, extensions)?.len())
}

/// File counts across the four dataset folders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInventory {
    pub backgrounds: usize,
    pub foregrounds: usize,
    pub images: usize,
    pub annotations: usize,
}

impl DatasetInventory {
    /// Count eligible files; missing folders count as empty.
    pub fn scan(
        layout: &DatasetLayout,
        sources: &SourceFilter,
        output: &OutputParams,
    ) -> Result<Self, DatasetError> {
        Ok(Self {
            backgrounds: count_or_zero(&layout.backgrounds_dir, &sources.background_extensions)?,
            foregrounds: count_or_zero(&layout.foregrounds_dir, &sources.foreground_extensions)?,
            images: count_or_zero(&layout.images_dir, &[output.image_extension.clone()])?,
            annotations: count_or_zero(&layout.annotations_dir, &["txt".to_string()])?,
        })
    }

    /// Generated images without a label file, or the reverse.
    pub fn unpaired(&self) -> usize {
        self.images.abs_diff(self.annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_sorted_matching_files_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.jpg", "a.JPEG", "c.png", "notes.txt", "d.heic"] {
            fs::write(dir.path().join(name), b"x").expect("write");
        }
        fs::create_dir(dir.path().join("nested.jpg")).expect("mkdir");

        let files = list_images(dir.path(), &SourceFilter::default().background_extensions)
            .expect("list");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPEG", "b.jpg", "c.png"]);
    }

    #[test]
    fn missing_directory_is_an_error_for_listing() {
        let err = list_images(Path::new("/definitely/not/here"), &["png".into()]).unwrap_err();
        assert!(matches!(err, DatasetError::ReadDir { .. }));
    }

    #[test]
    fn scan_counts_each_folder() {
        let root = tempfile::tempdir().expect("tempdir");
        let layout = DatasetLayout::new(
            root.path().join("bg"),
            root.path().join("fg"),
            root.path().join("out"),
            root.path().join("ann"),
        );
        fs::create_dir_all(&layout.backgrounds_dir).expect("mkdir");
        fs::create_dir_all(&layout.foregrounds_dir).expect("mkdir");
        fs::write(layout.backgrounds_dir.join("s1.jpg"), b"x").expect("write");
        fs::write(layout.backgrounds_dir.join("s2.png"), b"x").expect("write");
        fs::write(layout.foregrounds_dir.join("f1.png"), b"x").expect("write");
        fs::write(layout.foregrounds_dir.join("f2.jpg"), b"x").expect("write");

        let inv = DatasetInventory::scan(&layout, &SourceFilter::default(), &OutputParams::default())
            .expect("scan");
        assert_eq!(
            inv,
            DatasetInventory {
                backgrounds: 2,
                foregrounds: 1,
                images: 0,
                annotations: 0,
            }
        );
        assert_eq!(inv.unpaired(), 0);
    }
}
