//! Image registry
//!
//! Accumulates the flashable images of a release. Each registration copies
//! the build artifact into the release directory and records its size,
//! flash offset, relative path and SHA-256 digest. Images are identified by
//! name only; the catalog refers to them by that name.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::config::defaults::{DIGEST_ALGORITHM, MANIFEST_FILE};
use crate::error::ImageError;
use crate::infra::filesystem;

/// Content digest of an image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Signature {
    /// Always [`DIGEST_ALGORITHM`]
    pub algorithm: String,

    /// Lowercase hex digest (64 characters)
    pub value: String,
}

impl Signature {
    /// Compute the SHA-256 signature of raw bytes
    pub fn sha256(data: &[u8]) -> Self {
        Self {
            algorithm: DIGEST_ALGORITHM.to_string(),
            value: compute_checksum(data),
        }
    }

    /// Whether `data` hashes to this signature
    pub fn matches(&self, data: &[u8]) -> bool {
        self.algorithm == DIGEST_ALGORITHM
            && self.value.eq_ignore_ascii_case(&compute_checksum(data))
    }
}

/// One flashable binary artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    /// Byte length of the copied artifact
    pub size: u64,

    /// Flash address, kept verbatim (e.g. "0x0000")
    pub offset: String,

    /// Path of the artifact relative to the release directory
    pub path: String,

    /// Content digest
    pub signature: Signature,
}

/// Named images of a release, serialized as a JSON object keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ImageRegistry {
    images: BTreeMap<String, Image>,

    /// Release directory that artifacts are copied into
    #[serde(skip)]
    output_dir: PathBuf,

    /// Normalized destination -> image that was copied there
    #[serde(skip)]
    destinations: HashMap<String, String>,
}

impl ImageRegistry {
    /// Create an empty registry copying artifacts into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            images: BTreeMap::new(),
            output_dir: output_dir.into(),
            destinations: HashMap::new(),
        }
    }

    /// Register a build artifact under `name`.
    ///
    /// The artifact at `source` is copied to `destination` (relative to the
    /// release directory) and the copy is hashed. Name and destination are
    /// checked before anything is copied, so a rejected image never clobbers
    /// an earlier one or the manifest.
    pub fn register_image(
        &mut self,
        name: &str,
        offset: &str,
        source: &Path,
        destination: &str,
    ) -> Result<&Image, ImageError> {
        if name.is_empty() {
            return Err(ImageError::EmptyName);
        }
        if self.contains(name) {
            return Err(ImageError::Duplicate {
                name: name.to_string(),
            });
        }
        if !source.is_file() {
            return Err(ImageError::SourceUnavailable {
                name: name.to_string(),
                path: source.to_path_buf(),
            });
        }

        let destination =
            normalize_destination(destination).ok_or_else(|| ImageError::InvalidDestination {
                name: name.to_string(),
                path: destination.to_string(),
            })?;
        if let Some(owner) = self.destinations.get(&destination) {
            return Err(ImageError::DestinationInUse {
                name: name.to_string(),
                path: destination,
                owner: owner.clone(),
            });
        }

        let dest_path = self.output_dir.join(&destination);
        tracing::info!("Copying {} -> {}", source.display(), dest_path.display());

        filesystem::copy_file(source, &dest_path).map_err(|e| ImageError::Io {
            path: dest_path.clone(),
            error: e.to_string(),
        })?;
        let data = filesystem::read_bytes(&dest_path).map_err(|e| ImageError::Io {
            path: dest_path.clone(),
            error: e.to_string(),
        })?;

        let image = Image {
            size: data.len() as u64,
            offset: offset.to_string(),
            path: destination.clone(),
            signature: Signature::sha256(&data),
        };
        tracing::debug!(
            "Registered image '{name}': {} bytes, sha256 {}",
            image.size,
            image.signature.value
        );

        self.destinations.insert(destination, name.to_string());

        Ok(self.images.entry(name.to_string()).or_insert(image))
    }

    /// Whether an image named `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Look up an image by name
    pub fn get(&self, name: &str) -> Option<&Image> {
        self.images.get(name)
    }

    /// Number of registered images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image is registered
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Image)> {
        self.images.iter().map(|(name, image)| (name.as_str(), image))
    }
}

/// Resolve `.` and `..` in a release-relative path and join it with `/`.
///
/// `None` for paths that are empty, climb out of the release directory or
/// name the manifest itself.
pub fn normalize_destination(destination: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in destination.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            part => parts.push(part),
        }
    }
    let normalized = parts.join("/");
    if normalized.is_empty() || normalized == MANIFEST_FILE {
        return None;
    }
    Some(normalized)
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
