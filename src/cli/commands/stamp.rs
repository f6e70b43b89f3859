//! CLI implementation for `flashpack stamp` command

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{print_detail, print_json, print_success, OutputConfig};
use crate::config::defaults::STAMP_FILE;
use crate::core::stamp::{render_stamp, write_stamp};
use crate::infra::git;

/// Execute the stamp command
pub fn execute(project_root: &Path, output: Option<String>, print: bool) -> Result<()> {
    let identity = git::build_identity(project_root)?;
    let content = render_stamp(&identity);

    if print {
        print!("{content}");
        return Ok(());
    }

    let path = project_root.join(output.as_deref().unwrap_or(STAMP_FILE));
    let written = write_stamp(&path, &content)?;

    if OutputConfig::current().json {
        print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "info": identity.info,
            "url": identity.url,
            "written": written,
        }))?;
    } else if written {
        print_success(&format!("Wrote {}", path.display()));
        print_detail(&identity.info);
    } else {
        print_detail(&format!("{} is up to date", path.display()));
    }
    Ok(())
}
