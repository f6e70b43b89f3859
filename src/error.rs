//! Error types for flashpack
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Image registration errors
#[derive(Error, Debug)]
pub enum ImageError {
    /// Image name is empty
    #[error("Image name cannot be empty")]
    EmptyName,

    /// Image name registered twice
    #[error("Duplicate image name '{name}'")]
    Duplicate { name: String },

    /// Build artifact does not exist (target was not built)
    #[error("Source for image '{name}' not found at '{path}'. Was the target built?")]
    SourceUnavailable { name: String, path: PathBuf },

    /// Destination already holds another image
    #[error("Image '{name}' would overwrite '{path}', already written for image '{owner}'")]
    DestinationInUse {
        name: String,
        path: String,
        owner: String,
    },

    /// Destination is empty, leaves the release directory or is the manifest
    #[error("Image '{name}' has unusable destination '{path}'")]
    InvalidDestination { name: String, path: String },

    /// IO error while copying or hashing
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Installable catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Installable references an unregistered image
    #[error("Missing image '{image}' referenced by installable '{installable}'")]
    MissingImage { image: String, installable: String },

    /// Children declared beneath a section without a choice label
    #[error("Section '{section}' has no choice_name and cannot contain choices")]
    TerminalSection { section: String },
}

/// Release configuration (release.toml) errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration not found at '{path}'. Run 'flashpack init' to create one.")]
    NotFound { path: PathBuf },

    /// TOML parse error
    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Semantic validation failures, all reported together
    #[error("Invalid configuration:\n  - {}", problems.join("\n  - "))]
    Invalid { problems: Vec<String> },

    /// Environment variable substitution failed
    #[error("Environment substitution failed: {0}")]
    EnvSubstitution(String),
}

/// Merged flash image errors
#[derive(Error, Debug)]
pub enum MergeError {
    /// Image declares no merge layout
    #[error("Image '{name}' has no [images.merge] section")]
    NotConfigured { name: String },

    /// esptool not installed
    #[error("esptool not found in PATH (tried {})", tried.join(", "))]
    ToolNotFound { tried: Vec<String> },

    /// A part file is missing
    #[error("Merge part at {offset} not found: '{path}'")]
    MissingPart { offset: String, path: PathBuf },

    /// esptool exited unsuccessfully
    #[error("esptool merge_bin failed for '{output}' with status {status}")]
    Failed { output: PathBuf, status: String },

    /// IO error
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// Top-level flashpack error type
#[derive(Error, Debug)]
pub enum FlashpackError {
    /// Image error
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Merge error
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Git error
    #[error("Git error: {0}")]
    Git(#[from] crate::infra::git::GitError),

    /// Manifest serialization error
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}
