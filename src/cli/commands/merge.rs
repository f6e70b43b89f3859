//! CLI implementation for `flashpack merge` command
//!
//! Produces each image's merged flash file from the PlatformIO build output.

use std::path::Path;

use anyhow::{anyhow, Result};

use crate::cli::commands::load_config;
use crate::cli::output::{print_info, print_json, print_success, OutputConfig};
use crate::core::merge::MergePlan;
use crate::infra::esptool;

/// Execute the merge command
pub fn execute(project_root: &Path, image: Option<&str>, all: bool, dry_run: bool) -> Result<()> {
    let config = load_config(project_root)?;

    let plans = match image {
        Some(name) if !all => {
            let image = config
                .image(name)
                .ok_or_else(|| anyhow!("Image '{name}' is not declared in release.toml"))?;
            vec![MergePlan::for_image(&config, image, project_root)?]
        }
        _ => MergePlan::all(&config, project_root)?,
    };
    if plans.is_empty() {
        print_info("No image declares a merge layout");
        return Ok(());
    }

    let json = OutputConfig::current().json;
    if dry_run {
        if json {
            let commands: Vec<_> = plans
                .iter()
                .map(|plan| serde_json::json!({ "image": plan.image, "args": plan.args() }))
                .collect();
            print_json(&serde_json::json!({ "commands": commands }))?;
        } else {
            for plan in &plans {
                println!("esptool.py {}", plan.args().join(" "));
            }
        }
        return Ok(());
    }

    let tool = esptool::find_esptool()?;
    tracing::debug!("Using {}", tool.display());
    for plan in &plans {
        esptool::run(plan, &tool)?;
        print_success(&format!("Merged {} into {}", plan.image, plan.output.display()));
    }

    if json {
        let merged: Vec<_> = plans
            .iter()
            .map(|plan| {
                serde_json::json!({
                    "image": plan.image,
                    "output": plan.output.display().to_string(),
                })
            })
            .collect();
        print_json(&serde_json::json!({ "merged": merged }))?;
    }
    Ok(())
}
