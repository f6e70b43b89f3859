//! CLI implementation for `flashpack build` command

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::commands::{load_config, resolve_version};
use crate::cli::output::{create_image_bar, print_detail, print_json, print_success, OutputConfig};
use crate::config::defaults::MANIFEST_FILE;
use crate::core::release::build_manifest_with;

/// Execute the build command
pub fn execute(
    project_root: &Path,
    release_version: Option<String>,
    output: Option<String>,
) -> Result<()> {
    let mut config = load_config(project_root)?;
    if let Some(output) = output {
        config.release.output_dir = output;
    }
    config.validate()?;
    for warning in config.warnings() {
        tracing::warn!("{warning}");
    }

    let version = resolve_version(&config, release_version, project_root)?;
    tracing::info!("Building release {} {version}", config.release.name);

    let pb = create_image_bar(config.images.len() as u64);
    let manifest = build_manifest_with(&config, &version, project_root, |name, image| {
        tracing::debug!("Registered {name} ({} bytes at {})", image.size, image.offset);
        pb.set_message(name.to_string());
        pb.inc(1);
    });
    pb.finish_and_clear();
    let manifest = manifest.context("Release build failed")?;

    let manifest_path = config.output_dir(project_root).join(MANIFEST_FILE);
    manifest.write(&manifest_path)?;

    if OutputConfig::current().json {
        let images: Vec<_> = manifest
            .images()
            .iter()
            .map(|(name, image)| {
                serde_json::json!({
                    "name": name,
                    "path": image.path,
                    "size": image.size,
                    "sha256": image.signature.value,
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "name": manifest.name,
            "version": manifest.version,
            "manifest": manifest_path.display().to_string(),
            "images": images,
        }))?;
    } else {
        print_success(&format!(
            "Built {} {} ({} images)",
            manifest.name,
            manifest.version,
            manifest.images().len()
        ));
        for (name, image) in manifest.images().iter() {
            print_detail(&format!("{name}: {} ({} bytes)", image.path, image.size));
        }
        print_detail(&format!("Manifest: {}", manifest_path.display()));
    }

    Ok(())
}
