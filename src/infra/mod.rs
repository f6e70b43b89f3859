//! Infrastructure layer
//!
//! Handles the filesystem, git repositories and external processes.

pub mod esptool;
pub mod filesystem;
pub mod git;
