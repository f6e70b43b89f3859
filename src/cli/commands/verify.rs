//! CLI implementation for `flashpack verify` command

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::cli::commands::load_config;
use crate::cli::output::{print_detail, print_json, print_success, print_warning, OutputConfig};
use crate::config::defaults::MANIFEST_FILE;
use crate::core::manifest::Manifest;
use crate::core::verify::verify_manifest;

/// Execute the verify command
pub fn execute(project_root: &Path, path: Option<PathBuf>) -> Result<()> {
    let manifest_path = match path {
        Some(path) => project_root.join(path),
        None => load_config(project_root)?
            .output_dir(project_root)
            .join(MANIFEST_FILE),
    };
    let release_dir = manifest_path
        .parent()
        .map_or_else(|| project_root.to_path_buf(), Path::to_path_buf);

    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let report = verify_manifest(&manifest, &release_dir);

    if OutputConfig::current().json {
        print_json(&serde_json::json!({
            "valid": report.is_valid(),
            "manifest": manifest_path.display().to_string(),
            "verified_images": report.verified_images,
            "installables": report.installables,
            "problems": report.problems,
            "warnings": report.warnings,
        }))?;
    } else if report.is_valid() {
        for warning in &report.warnings {
            print_warning(warning);
        }
        print_success(&format!(
            "{} {}: {} images and {} installables verified",
            manifest.name,
            manifest.version,
            report.verified_images.len(),
            report.installables
        ));
    } else {
        print_warning(&format!("{} is inconsistent:", manifest_path.display()));
        for problem in &report.problems {
            print_detail(problem);
        }
    }

    if !report.is_valid() {
        bail!("Manifest verification failed");
    }
    Ok(())
}
