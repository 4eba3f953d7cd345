//! Bundler asset manifest.
//!
//! The bundler writes a JSON array of `{ "name": ..., "url": ... }` entries
//! describing the script chunks of the current build. Chunks generated
//! without a name (shared commons chunks) omit `name`.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// One bundle produced by the bundler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleAsset {
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
}

impl BundleAsset {
    pub fn named(name: &str, url: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            url: url.to_string(),
        }
    }

    pub fn unnamed(url: &str) -> Self {
        Self {
            name: None,
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read bundle manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse bundle manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a manifest file.
pub fn read_manifest(path: &Path) -> Result<Vec<BundleAsset>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Current manifest snapshot, replaced atomically on reload.
#[derive(Debug)]
pub struct BundleManifestStore {
    path: Option<PathBuf>,
    current: ArcSwap<Vec<BundleAsset>>,
}

impl BundleManifestStore {
    /// Store with a fixed set of bundles and no backing file.
    pub fn from_assets(assets: Vec<BundleAsset>) -> Self {
        Self {
            path: None,
            current: ArcSwap::from_pointee(assets),
        }
    }

    /// Store backed by a manifest file, loaded immediately.
    pub fn open(path: &Path) -> Result<Self, ManifestError> {
        let assets = read_manifest(path)?;
        tracing::info!(path = %path.display(), bundles = assets.len(), "Bundle manifest loaded");
        Ok(Self {
            path: Some(path.to_path_buf()),
            current: ArcSwap::from_pointee(assets),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The bundles of the current build.
    pub fn snapshot(&self) -> Arc<Vec<BundleAsset>> {
        self.current.load_full()
    }

    /// Replace the current bundles.
    pub fn replace(&self, assets: Vec<BundleAsset>) {
        self.current.store(Arc::new(assets));
    }

    /// Re-read the backing file. On failure the previous snapshot is kept.
    pub fn reload(&self) -> Result<usize, ManifestError> {
        let Some(path) = &self.path else {
            return Ok(self.current.load().len());
        };
        let assets = read_manifest(path)?;
        let count = assets.len();
        self.replace(assets);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assets.json");
        fs::write(&path, r#"[{"name":"build","url":"/calypso/build.js"},{"url":"/calypso/vendor.abc.js"}]"#).unwrap();

        let store = BundleManifestStore::open(&path).unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], BundleAsset::named("build", "/calypso/build.js"));
        assert_eq!(snapshot[1].name, None);

        fs::write(&path, r#"[{"name":"build","url":"/calypso/build.js"}]"#).unwrap();
        assert_eq!(store.reload().unwrap(), 1);
        assert_eq!(store.snapshot().len(), 1);
        // Old readers keep their snapshot.
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_invalid_reload_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("assets.json");
        fs::write(&path, r#"[{"url":"/calypso/build.js"}]"#).unwrap();
        let store = BundleManifestStore::open(&path).unwrap();

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(store.reload(), Err(ManifestError::Parse { .. })));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = BundleManifestStore::open(Path::new("/missing/assets.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
