//! CLI implementation for `flashpack check` command
//!
//! Validates release.toml and looks for every image source without copying
//! anything.

use std::path::Path;

use anyhow::{bail, Result};

use crate::cli::commands::load_config;
use crate::cli::output::{print_detail, print_json, print_success, print_warning, OutputConfig};
use crate::error::ConfigError;

/// Execute the check command
pub fn execute(project_root: &Path) -> Result<()> {
    let config = load_config(project_root)?;

    let mut problems = match config.validate() {
        Ok(()) => Vec::new(),
        Err(ConfigError::Invalid { problems }) => problems,
        Err(e) => return Err(e.into()),
    };
    for (name, path) in config.missing_sources(project_root) {
        problems.push(format!("Image '{name}' source {} does not exist", path.display()));
    }
    let warnings = config.warnings();
    tracing::debug!("Checked {} images", config.images.len());

    if OutputConfig::current().json {
        print_json(&serde_json::json!({
            "valid": problems.is_empty(),
            "images": config.images.len(),
            "problems": problems,
            "warnings": warnings,
        }))?;
    } else {
        for warning in &warnings {
            print_warning(warning);
        }
        if problems.is_empty() {
            print_success(&format!(
                "{} is ready to build ({} images)",
                config.release.name,
                config.images.len()
            ));
        } else {
            print_warning(&format!("Found {} problems:", problems.len()));
            for problem in &problems {
                print_detail(problem);
            }
        }
    }

    if !problems.is_empty() {
        bail!("Release configuration check failed");
    }
    Ok(())
}
