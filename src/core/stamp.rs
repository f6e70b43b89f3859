//! Build identity stamp
//!
//! Generates the small C++ source file that bakes the firmware's git
//! identity into the binary. The file is only rewritten when its content
//! changes.

use std::path::Path;

use crate::config::defaults::NO_GIT;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Human-readable identity of a firmware build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIdentity {
    /// `<branch>-<short sha>[-dirty]`
    pub info: String,

    /// `remote.origin.url`, or "None"
    pub url: String,
}

impl BuildIdentity {
    /// Identity from repository facts
    pub fn new(branch: &str, short_rev: &str, dirty: bool, url: Option<String>) -> Self {
        let suffix = if dirty { "-dirty" } else { "" };
        Self {
            info: format!("{branch}-{short_rev}{suffix}"),
            url: url.unwrap_or_else(|| "None".to_string()),
        }
    }

    /// Identity used outside a git checkout
    pub fn no_git() -> Self {
        Self {
            info: NO_GIT.to_string(),
            url: NO_GIT.to_string(),
        }
    }
}

/// Escape a value for a C string literal
fn c_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the version source file
pub fn render_stamp(identity: &BuildIdentity) -> String {
    format!(
        "const char* git_info     = \"{}\";\nconst char* git_url      = \"{}\";\n",
        c_string(&identity.info),
        c_string(&identity.url)
    )
}

/// Write `content` to `path` unless the file already holds it.
///
/// Returns whether the file was written.
pub fn write_stamp(path: &Path, content: &str) -> Result<bool, FilesystemError> {
    if path.is_file() && filesystem::read_file(path)? == content {
        tracing::debug!("{} is up to date", path.display());
        return Ok(false);
    }
    filesystem::write_file(path, content)?;
    Ok(true)
}
