//! Release manifest (manifest.json)
//!
//! The manifest is the aggregate handed to the web installer: release
//! metadata, the image registry keyed by name and the installable catalog.
//! It is built once per release and written exactly once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::defaults::ROOT_SECTION;
use crate::core::catalog::{ChoiceList, ChoiceSection};
use crate::core::registry::{Image, ImageRegistry};
use crate::error::{FlashpackError, ImageError};
use crate::infra::filesystem;

/// Fixed metadata of a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Product name
    pub name: String,

    /// Release version (usually the latest git tag)
    pub version: String,

    pub source_url: String,
    pub release_url: String,
    pub funding_url: String,
}

/// The release manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub source_url: String,
    pub release_url: String,
    pub funding_url: String,

    /// Image registry keyed by name
    images: ImageRegistry,

    /// Reserved for filesystem uploads, always empty
    #[serde(default)]
    files: BTreeMap<String, serde_json::Value>,

    /// Root of the installable catalog
    installable: ChoiceSection,
}

impl Manifest {
    /// Create an empty manifest whose images are copied into `output_dir`
    pub fn new(
        info: ReleaseInfo,
        output_dir: impl Into<PathBuf>,
        catalog_description: impl Into<String>,
        choice_name: impl Into<String>,
    ) -> Self {
        Self {
            name: info.name,
            version: info.version,
            source_url: info.source_url,
            release_url: info.release_url,
            funding_url: info.funding_url,
            images: ImageRegistry::new(output_dir),
            files: BTreeMap::new(),
            installable: ChoiceSection::new(ROOT_SECTION, catalog_description, choice_name),
        }
    }

    /// Register a build artifact, see [`ImageRegistry::register_image`]
    pub fn register_image(
        &mut self,
        name: &str,
        offset: &str,
        source: &Path,
        destination: &str,
    ) -> Result<&Image, ImageError> {
        self.images
            .register_image(name, offset, source, destination)
    }

    /// The image registry
    pub fn images(&self) -> &ImageRegistry {
        &self.images
    }

    /// Root section of the catalog
    pub fn catalog(&self) -> &ChoiceSection {
        &self.installable
    }

    /// Registry and root children handle for building the catalog.
    ///
    /// `None` only for a parsed manifest whose root has no choices.
    pub fn catalog_mut(&mut self) -> Option<(&ImageRegistry, &mut ChoiceList)> {
        let choices = self.installable.choices_mut()?;
        Some((&self.images, choices))
    }

    /// Serialize to pretty JSON.
    ///
    /// Output is deterministic: struct fields keep declaration order, images
    /// are sorted by name and the catalog keeps insertion order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a manifest from JSON
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load a manifest from file path
    pub fn load(path: &Path) -> Result<Self, FlashpackError> {
        let content = filesystem::read_file(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Write the manifest to `path`, replacing any previous manifest
    pub fn write(&self, path: &Path) -> Result<(), FlashpackError> {
        let mut json = self.to_json()?;
        json.push('\n');
        filesystem::write_file(path, &json)?;
        tracing::info!("Wrote manifest {}", path.display());
        Ok(())
    }
}
