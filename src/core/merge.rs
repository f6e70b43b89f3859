//! Merged flash image planning
//!
//! A merged image combines bootloader, partition table, firmware and
//! filesystem blobs at fixed offsets into the single file that is published
//! per build target. The merge itself is done by esptool's `merge_bin`; this
//! module only describes it.

use std::path::{Path, PathBuf};

use crate::config::defaults::FLASH_MODE;
use crate::core::release::{ImageConfig, ReleaseConfig};
use crate::error::MergeError;

/// Inputs of one `esptool merge_bin` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Image being produced
    pub image: String,

    pub chip: String,
    pub flash_size: String,
    pub flash_mode: String,

    /// Merged output file
    pub output: PathBuf,

    /// `(offset, file)` pairs in the order given to esptool
    pub parts: Vec<(String, PathBuf)>,
}

impl MergePlan {
    /// Plan the merge for `image`; part files resolve against
    /// `<build_dir>/<image>` and the output is the image's source file
    pub fn for_image(
        config: &ReleaseConfig,
        image: &ImageConfig,
        project_root: &Path,
    ) -> Result<Self, MergeError> {
        let merge = image.merge.as_ref().ok_or_else(|| MergeError::NotConfigured {
            name: image.name.clone(),
        })?;
        let target_dir = project_root
            .join(&config.release.build_dir)
            .join(&image.name);

        Ok(Self {
            image: image.name.clone(),
            chip: merge.chip.clone(),
            flash_size: merge.flash_size.clone(),
            flash_mode: FLASH_MODE.to_string(),
            output: image.source_path(project_root, &config.release.build_dir),
            parts: merge
                .parts
                .iter()
                .map(|part| (part.offset.clone(), target_dir.join(&part.file)))
                .collect(),
        })
    }

    /// Plans for every image that declares a merge layout
    pub fn all(config: &ReleaseConfig, project_root: &Path) -> Result<Vec<Self>, MergeError> {
        config
            .images
            .iter()
            .filter(|image| image.merge.is_some())
            .map(|image| Self::for_image(config, image, project_root))
            .collect()
    }

    /// Fail on the first part file that does not exist
    pub fn validate(&self) -> Result<(), MergeError> {
        for (offset, path) in &self.parts {
            if !path.is_file() {
                return Err(MergeError::MissingPart {
                    offset: offset.clone(),
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    /// esptool arguments
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--chip".to_string(),
            self.chip.clone(),
            "merge_bin".to_string(),
            "--output".to_string(),
            self.output.display().to_string(),
            "--flash_mode".to_string(),
            self.flash_mode.clone(),
            "--flash_size".to_string(),
            self.flash_size.clone(),
        ];
        for (offset, path) in &self.parts {
            args.push(offset.clone());
            args.push(path.display().to_string());
        }
        args
    }
}
