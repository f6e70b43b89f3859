//! Release URL derivation

/// Browse URL for the sources of a release
pub fn source_url(repository: &str, version: &str) -> String {
    format!("{}/tree/{version}", repository.trim_end_matches('/'))
}

/// Release page URL for a tagged release
pub fn release_url(repository: &str, version: &str) -> String {
    format!("{}/releases/tag/{version}", repository.trim_end_matches('/'))
}
