//! Output formatting and progress indicators
//!
//! This module provides the global output mode, progress bars and status
//! prefixes used by the commands.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::OnceLock;

static OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

/// Output mode selected by the global flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Only errors are printed
    pub quiet: bool,

    /// Results are printed as JSON
    pub json: bool,

    /// Verbosity count (-v, -vv)
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this the process-wide output mode (first call wins)
    pub fn apply_global(self) {
        let _ = OUTPUT.set(self);
    }

    /// The process-wide output mode
    pub fn current() -> Self {
        OUTPUT.get().copied().unwrap_or_default()
    }

    /// Log level implied by the verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, _) => tracing::Level::DEBUG,
        }
    }

    /// Whether human-readable progress and status lines are shown
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

fn print_status(prefix: &str, message: &str) {
    if OutputConfig::current().show_progress() {
        println!("{prefix} {message}");
    }
}

/// Print a success line
pub fn print_success(message: &str) {
    print_status(status::SUCCESS, message);
}

/// Print a warning line
pub fn print_warning(message: &str) {
    print_status(status::WARNING, message);
}

/// Print an informational line
pub fn print_info(message: &str) {
    print_status(status::INFO, message);
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    if OutputConfig::current().show_progress() {
        println!("  {message}");
    }
}

/// Print a JSON document to stdout
pub fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display an error and its cause chain on stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}

/// Create a progress bar for image registration
pub fn create_image_bar(total: u64) -> ProgressBar {
    if !OutputConfig::current().show_progress() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} images ({msg})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
