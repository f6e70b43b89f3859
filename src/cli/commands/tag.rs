//! CLI implementation for `flashpack tag` command

use std::path::Path;

use anyhow::Result;

use crate::cli::commands::{load_config, resolve_version};
use crate::cli::output::{print_json, OutputConfig};

/// Execute the tag command
pub fn execute(project_root: &Path) -> Result<()> {
    let config = load_config(project_root)?;
    let version = resolve_version(&config, None, project_root)?;

    if OutputConfig::current().json {
        print_json(&serde_json::json!({ "version": version }))?;
    } else {
        println!("{version}");
    }
    Ok(())
}
