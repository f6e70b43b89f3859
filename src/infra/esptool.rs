//! esptool invocation
//!
//! Runs `merge_bin` for a [`MergePlan`].

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::merge::MergePlan;
use crate::error::MergeError;

/// Executable names tried in order
pub const ESPTOOL_CANDIDATES: &[&str] = &["esptool.py", "esptool"];

/// Locate esptool in PATH
pub fn find_esptool() -> Result<PathBuf, MergeError> {
    ESPTOOL_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| MergeError::ToolNotFound {
            tried: ESPTOOL_CANDIDATES.iter().map(ToString::to_string).collect(),
        })
}

/// Run esptool for `plan` after checking that every part exists
pub fn run(plan: &MergePlan, esptool: &Path) -> Result<(), MergeError> {
    plan.validate()?;

    if let Some(parent) = plan.output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MergeError::Io {
            path: parent.to_path_buf(),
            error: e.to_string(),
        })?;
    }

    let args = plan.args();
    tracing::info!("Running {} {}", esptool.display(), args.join(" "));

    let status = Command::new(esptool)
        .args(&args)
        .status()
        .map_err(|e| MergeError::Io {
            path: esptool.to_path_buf(),
            error: e.to_string(),
        })?;

    if !status.success() {
        return Err(MergeError::Failed {
            output: plan.output.clone(),
            status: status.to_string(),
        });
    }
    Ok(())
}
