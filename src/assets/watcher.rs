//! Bundle manifest watcher for hot reload.

use std::sync::Arc;
use std::time::Duration;
use notify::{Watcher, RecursiveMode, Event, RecommendedWatcher, Config};

use crate::assets::manifest::BundleManifestStore;

/// Reloads the bundle manifest whenever the bundler rewrites it.
pub struct ManifestWatcher {
    store: Arc<BundleManifestStore>,
}

impl ManifestWatcher {
    pub fn new(store: Arc<BundleManifestStore>) -> Self {
        Self { store }
    }

    /// Start watching the manifest file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    /// Returns `Ok(None)` when the store has no backing file.
    pub fn run(self) -> Result<Option<RecommendedWatcher>, notify::Error> {
        let Some(path) = self.store.path().map(|p| p.to_path_buf()) else {
            return Ok(None);
        };
        let store = self.store.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        match store.reload() {
                            Ok(bundles) => tracing::info!(bundles, "Bundle manifest reloaded"),
                            Err(e) => {
                                tracing::error!("Failed to reload bundle manifest: {}. Keeping current bundles.", e);
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Bundle manifest watcher started");
        Ok(Some(watcher))
    }
}
