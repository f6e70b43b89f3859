//! Core business logic module
//!
//! # Submodules
//!
//! - [`registry`] - Image registry (copy, size, digest)
//! - [`catalog`] - Installable catalog tree builder
//! - [`manifest`] - Release manifest aggregate and JSON serialization
//! - [`release`] - release.toml parsing, validation and manifest assembly
//! - [`verify`] - Verification of a written manifest against its files
//! - [`merge`] - Merged flash image planning
//! - [`stamp`] - Build identity source file
//! - [`init`] - Project initialization logic

pub mod catalog;
pub mod init;
pub mod manifest;
pub mod merge;
pub mod registry;
pub mod release;
pub mod stamp;
pub mod verify;
