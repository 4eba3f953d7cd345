//! Asset version tokens for cache busting.
//!
//! Uses a content hash to generate version strings for assets.
//! When asset content changes between deploys, the token changes and
//! browsers re-fetch.

use dashmap::DashMap;
use md5::{Digest, Md5};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of a content-derived version token.
pub const HASH_LENGTH: usize = 10;

/// Compute a version token from file content (first 10 hex chars of MD5).
///
/// Unreadable files get the current time in milliseconds instead.
pub fn compute_token(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(content) => {
            let digest = Md5::digest(&content);
            let mut token = hex::encode(digest);
            token.truncate(HASH_LENGTH);
            token
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Asset unreadable, using timestamp version");
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis()
                .to_string()
        }
    }
}

/// Asset path → version token, kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct VersionCache {
    entries: DashMap<PathBuf, String>,
}

impl VersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the token for `path`, computing it on first use.
    ///
    /// Concurrent first uses may both hash the file; the first insert wins.
    pub fn token(&self, path: &Path) -> String {
        if let Some(token) = self.entries.get(path) {
            return token.clone();
        }
        let computed = compute_token(path);
        self.entries
            .entry(path.to_path_buf())
            .or_insert(computed)
            .clone()
    }

    /// Number of cached tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compute_token() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("style.css");
        fs::write(&file, "body { color: red; }").unwrap();

        let v1 = compute_token(&file);
        assert_eq!(v1.len(), HASH_LENGTH);
        assert!(v1.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(v1, compute_token(&file));

        fs::write(&file, "body { color: blue; }").unwrap();
        assert_ne!(v1, compute_token(&file));
    }

    #[test]
    fn test_known_digest() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("empty.css");
        fs::write(&file, "").unwrap();
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(compute_token(&file), "d41d8cd98f");
    }

    #[test]
    fn test_missing_file_falls_back_to_timestamp() {
        let token = compute_token(Path::new("/definitely/not/here.css"));
        assert!(!token.is_empty());
        assert!(token.parse::<u128>().is_ok());
    }

    #[test]
    fn test_cache_keeps_first_token() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.css");
        fs::write(&file, "a {}").unwrap();

        let cache = VersionCache::new();
        let first = cache.token(&file);

        fs::write(&file, "a { color: red; }").unwrap();
        assert_eq!(cache.token(&file), first);
        assert_eq!(cache.len(), 1);
    }
}
