//! Manifest verification
//!
//! Re-reads a written manifest and checks it against the release directory:
//! each image file must exist with the recorded size and digest, and each
//! installable must reference listed images only.

use std::path::Path;

use crate::config::defaults::DIGEST_ALGORITHM;
use crate::core::manifest::Manifest;
use crate::infra::filesystem;

/// Outcome of verifying a manifest
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Images whose file matched the manifest
    pub verified_images: Vec<String>,

    /// Number of installables checked
    pub installables: usize,

    /// Everything that did not match
    pub problems: Vec<String>,

    /// Oddities that do not make the manifest invalid
    pub warnings: Vec<String>,
}

impl VerifyReport {
    /// Check if all validations passed
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Verify `manifest` against the files under `release_dir`
pub fn verify_manifest(manifest: &Manifest, release_dir: &Path) -> VerifyReport {
    let mut report = VerifyReport::default();

    for (name, image) in manifest.images().iter() {
        if image.signature.algorithm != DIGEST_ALGORITHM {
            report.problems.push(format!(
                "Image '{name}' uses unsupported algorithm '{}'",
                image.signature.algorithm
            ));
            continue;
        }

        let path = release_dir.join(&image.path);
        let data = match filesystem::read_bytes(&path) {
            Ok(data) => data,
            Err(e) => {
                report.problems.push(format!("Image '{name}': {e}"));
                continue;
            }
        };

        if data.len() as u64 != image.size {
            report.problems.push(format!(
                "Image '{name}' size mismatch: manifest says {}, file has {}",
                image.size,
                data.len()
            ));
        } else if !image.signature.matches(&data) {
            report
                .problems
                .push(format!("Image '{name}' digest does not match '{}'", image.path));
        } else {
            report.verified_images.push(name.to_string());
        }
    }

    for section in manifest.catalog().malformed_sections() {
        report.problems.push(format!(
            "Section '{section}' must have both choice-name and choices, or neither"
        ));
    }

    for (path, installable) in manifest.catalog().installables() {
        report.installables += 1;
        if installable.images.is_empty() {
            report.warnings.push(format!("Installable '{path}' lists no images"));
        }
        for image in &installable.images {
            if !manifest.images().contains(image) {
                report
                    .problems
                    .push(format!("Installable '{path}' references missing image '{image}'"));
            }
        }
    }

    report
}
