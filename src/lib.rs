//! flashpack - Release packager for ESP32 firmware images
//!
//! This library builds the `manifest.json` that a web installer reads to
//! offer firmware images for flashing: which processor and device variants
//! exist, and which images each install operation writes.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Image registry, catalog tree, manifest assembly
//! - [`infra`] - Infrastructure layer (filesystem, git, esptool)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
