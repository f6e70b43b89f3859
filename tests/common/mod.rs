//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// A temporary firmware project with a release.toml and the PlatformIO
/// build output the release is assembled from.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Project with [`SAMPLE_CONFIG`] and both merged images in place
    pub fn with_sample_release() -> Self {
        let project = Self::new();
        project.create_file("release.toml", SAMPLE_CONFIG);
        project.write_image("m5dial", &[0xA5; 500]);
        project.write_image("cyddial", &[0x5A; 320]);
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Write the merged flash image PlatformIO would leave for `name`
    pub fn write_image(&self, name: &str, data: &[u8]) {
        let dir = self.dir.path().join(".pio/build").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create build directory");
        std::fs::write(dir.join("merged-flash.bin"), data).expect("Failed to write image");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Parse the written release manifest
    pub fn manifest(&self) -> serde_json::Value {
        serde_json::from_str(&self.read_file("release/manifest.json"))
            .expect("manifest.json should be valid JSON")
    }

    /// Run flashpack in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        self.run_with_env(args, &[])
    }

    /// Run flashpack with extra environment variables set
    pub fn run_with_env(&self, args: &[&str], vars: &[(&str, &str)]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_flashpack"))
            .current_dir(self.dir.path())
            .env_remove("FLASHPACK_PROJECT")
            .env_remove("RUST_LOG")
            .envs(vars.iter().copied())
            .args(args)
            .output()
            .expect("Failed to execute flashpack")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Stdout of a finished command
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished command
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Two-image release with a pinned version so no git checkout is needed
pub const SAMPLE_CONFIG: &str = r#"
[release]
name = "FluidDial"
version = "v1.0.0"
repository = "https://github.com/bdring/FluidDial"
funding_url = "https://www.paypal.com/donate/?hosted_button_id=8DYLB6ZYYDG7Y"

[[images]]
name = "m5dial"

[[images]]
name = "cyddial"

[catalog]
description = "Things you can install"
choice_name = "Processor type"

[[catalog.choices]]
name = "ESP32-S3"
description = "ESP32-S3 based dials"
choice_name = "Dial type"

[[catalog.choices.choices]]
name = "M5Dial"
description = "FluidDial for M5Dial"
choice_name = "Installation type"

[[catalog.choices.choices.choices]]
name = "install"
description = "Complete FluidDial installation"
erase = true
images = ["m5dial"]

[[catalog.choices]]
name = "ESP32"
description = "ESP32 based dials"
choice_name = "Dial type"

[[catalog.choices.choices]]
name = "CYD"
description = "FluidDial for CYD Dial"
choice_name = "Installation type"

[[catalog.choices.choices.choices]]
name = "install"
description = "Complete FluidDial installation"
erase = true
images = ["cyddial"]
"#;
