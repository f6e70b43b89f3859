//! Git operations
//!
//! Release version lookup and build identity using the gix crate.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::stamp::BuildIdentity;

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Path is not inside a git repository
    #[error("'{path}' is not inside a git repository: {error}")]
    NotARepository { path: PathBuf, error: String },

    /// Repository has no commit checked out
    #[error("Repository at '{path}' has no HEAD commit: {error}")]
    NoHead { path: PathBuf, error: String },

    /// No tag is reachable from HEAD
    #[error("No tag reachable from HEAD in '{path}'. Tag the release or set release.version")]
    NoTag { path: PathBuf },

    /// Any other repository query failed
    #[error("Git query '{query}' failed: {error}")]
    Query { query: String, error: String },
}

fn open(path: &Path) -> Result<gix::Repository, GitError> {
    gix::discover(path).map_err(|e| GitError::NotARepository {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Nearest tag reachable from HEAD (`git describe --tags --abbrev=0`)
pub fn latest_tag(path: &Path) -> Result<String, GitError> {
    let repo = open(path)?;
    let commit = repo.head_commit().map_err(|e| GitError::NoHead {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let describe = commit
        .describe()
        .names(gix::commit::describe::SelectRef::AllTags);
    let resolution = describe
        .try_resolve()
        .map_err(|e| GitError::Query {
            query: "describe --tags".to_string(),
            error: e.to_string(),
        })?;

    let tag = resolution
        .and_then(|resolution| resolution.outcome.name)
        .map(|name| name.to_string())
        .ok_or_else(|| GitError::NoTag {
            path: path.to_path_buf(),
        })?;
    tracing::debug!("Latest tag in {}: {tag}", path.display());
    Ok(tag)
}

/// Branch, short revision, dirty flag and origin URL of the checkout.
///
/// Outside a git repository the "(noGit)" identity is returned.
pub fn build_identity(path: &Path) -> Result<BuildIdentity, GitError> {
    let Ok(repo) = gix::discover(path) else {
        tracing::warn!("{} is not a git checkout", path.display());
        return Ok(BuildIdentity::no_git());
    };

    let branch = repo
        .head_name()
        .map_err(|e| GitError::Query {
            query: "rev-parse --abbrev-ref HEAD".to_string(),
            error: e.to_string(),
        })?
        .map_or_else(|| "HEAD".to_string(), |name| name.shorten().to_string());

    let head = repo.head_id().map_err(|e| GitError::NoHead {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    let short_rev = head.shorten_or_id().to_string();

    // Untracked files do not count as modifications.
    let dirty = repo.is_dirty().map_err(|e| GitError::Query {
        query: "status".to_string(),
        error: e.to_string(),
    })?;

    let url = repo
        .config_snapshot()
        .string("remote.origin.url")
        .map(|url| url.to_string());

    Ok(BuildIdentity::new(&branch, &short_rev, dirty, url))
}
