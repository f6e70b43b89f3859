//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod check;
pub mod init;
pub mod merge;
pub mod stamp;
pub mod tag;
pub mod verify;

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::config::defaults::CONFIG_FILE;
use crate::core::release::ReleaseConfig;
use crate::infra::git;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a release.toml template
    Init {
        /// Product name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing release.toml
        #[arg(short, long)]
        force: bool,
    },

    /// Copy images and write the release manifest
    Build {
        /// Release version (defaults to release.version or the latest git tag)
        #[arg(long, value_name = "VERSION")]
        release_version: Option<String>,

        /// Release directory (overrides release.output_dir)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate release.toml and image sources without writing anything
    Check,

    /// Verify a written manifest against its image files
    Verify {
        /// Manifest path (defaults to <output_dir>/manifest.json)
        path: Option<PathBuf>,
    },

    /// Build merged flash images with esptool
    Merge {
        /// Image to merge
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        image: Option<String>,

        /// Merge every image that declares a merge layout
        #[arg(long)]
        all: bool,

        /// Print the esptool command lines without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the firmware build identity source file
    Stamp {
        /// Output file (defaults to src/version.cpp)
        #[arg(short, long)]
        output: Option<String>,

        /// Print the file content instead of writing it
        #[arg(long)]
        print: bool,
    },

    /// Print the release version a build would use
    Tag,
}

impl Commands {
    /// Execute the command
    pub fn run(self, project_root: &Path) -> Result<()> {
        match self {
            Self::Init { name, force } => init::execute(project_root, name, force),
            Self::Build {
                release_version,
                output,
            } => build::execute(project_root, release_version, output),
            Self::Check => check::execute(project_root),
            Self::Verify { path } => verify::execute(project_root, path),
            Self::Merge {
                image,
                all,
                dry_run,
            } => merge::execute(project_root, image.as_deref(), all, dry_run),
            Self::Stamp { output, print } => stamp::execute(project_root, output, print),
            Self::Tag => tag::execute(project_root),
        }
    }
}

/// Load `release.toml` from the project root
pub fn load_config(project_root: &Path) -> Result<ReleaseConfig> {
    let path = project_root.join(CONFIG_FILE);
    ReleaseConfig::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Version for a build: explicit override, then `release.version`, then
/// the latest git tag
pub fn resolve_version(
    config: &ReleaseConfig,
    explicit: Option<String>,
    project_root: &Path,
) -> Result<String> {
    if let Some(version) = explicit.or_else(|| config.release.version.clone()) {
        return Ok(version);
    }
    git::latest_tag(project_root).context("Failed to determine release version")
}
