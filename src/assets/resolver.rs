//! Asset URL resolution.
//!
//! # Responsibilities
//! - Version every configured static file with its content token
//! - Name unnamed bundler chunks deterministically
//! - Add minified variants outside development

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::assets::manifest::BundleManifestStore;
use crate::assets::version::VersionCache;
use crate::config::AssetConfig;

/// Logical asset name → versioned URL for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StaticAssetMap(BTreeMap<String, String>);

impl StaticAssetMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.0.insert(name.into(), url.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Name for a chunk the bundler emitted without one.
///
/// `/calypso/vendor.3f2a.js` becomes `_vendor`. URLs of any other shape are
/// used as their own name.
pub fn chunk_name(url: &str, url_prefix: &str) -> String {
    let Some(file) = url.strip_prefix(url_prefix) else {
        return url.to_string();
    };
    let stem_len = file
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(file.len());
    if stem_len == 0 || !file[stem_len..].starts_with('.') {
        return url.to_string();
    }
    format!("_{}", &file[..stem_len])
}

/// Minified variant of a script URL (first `.js` becomes `.m.js`).
pub fn minified_url(url: &str) -> String {
    url.replacen(".js", ".m.js", 1)
}

/// Builds the asset map for each request.
#[derive(Debug)]
pub struct AssetResolver {
    public_dir: PathBuf,
    url_prefix: String,
    static_files: Vec<String>,
    minify: bool,
    cache: VersionCache,
    bundles: Arc<BundleManifestStore>,
}

impl AssetResolver {
    /// `minify` adds `-min` variants; it is off in development.
    pub fn new(config: &AssetConfig, minify: bool, bundles: Arc<BundleManifestStore>) -> Self {
        Self {
            public_dir: PathBuf::from(&config.public_dir),
            url_prefix: config.url_prefix.clone(),
            static_files: config.static_files.clone(),
            minify,
            cache: VersionCache::new(),
            bundles,
        }
    }

    /// Resolve every static file and the current bundles.
    pub fn resolve(&self) -> StaticAssetMap {
        let mut urls = StaticAssetMap::default();

        for file in &self.static_files {
            let token = self.cache.token(&self.public_dir.join(file));
            urls.insert(file.as_str(), self.static_url(file, &token));
        }

        for asset in self.bundles.snapshot().iter() {
            let name = asset
                .name
                .clone()
                .unwrap_or_else(|| chunk_name(&asset.url, &self.url_prefix));
            if self.minify {
                urls.insert(format!("{}-min", name), minified_url(&asset.url));
            }
            urls.insert(name, asset.url.as_str());
        }

        urls
    }

    fn static_url(&self, file: &str, token: &str) -> String {
        format!("{}{}?v={}", self.url_prefix, file, token)
    }

    /// The process-lifetime version cache.
    pub fn cache(&self) -> &VersionCache {
        &self.cache
    }

    pub fn bundles(&self) -> &Arc<BundleManifestStore> {
        &self.bundles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::manifest::BundleAsset;
    use std::fs;
    use tempfile::TempDir;

    fn resolver(dir: &TempDir, minify: bool, bundles: Vec<BundleAsset>) -> AssetResolver {
        let config = AssetConfig {
            public_dir: dir.path().to_string_lossy().into_owned(),
            static_files: vec!["style.css".into(), "missing.css".into()],
            ..AssetConfig::default()
        };
        AssetResolver::new(&config, minify, Arc::new(BundleManifestStore::from_assets(bundles)))
    }

    #[test]
    fn test_chunk_name() {
        assert_eq!(chunk_name("/calypso/vendor.3f2a.js", "/calypso/"), "_vendor");
        assert_eq!(chunk_name("/calypso/commons.js", "/calypso/"), "_commons");
        assert_eq!(chunk_name("/other/commons.js", "/calypso/"), "/other/commons.js");
        assert_eq!(chunk_name("/calypso/nodot", "/calypso/"), "/calypso/nodot");
    }

    #[test]
    fn test_minified_url() {
        assert_eq!(minified_url("/calypso/build.js"), "/calypso/build.m.js");
        assert_eq!(minified_url("/calypso/style.css"), "/calypso/style.css");
    }

    #[test]
    fn test_resolve_static_and_bundles() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), "").unwrap();

        let resolver = resolver(
            &dir,
            true,
            vec![
                BundleAsset::named("build", "/calypso/build.js"),
                BundleAsset::unnamed("/calypso/vendor.abc.js"),
            ],
        );
        let urls = resolver.resolve();

        assert_eq!(urls.get("style.css"), Some("/calypso/style.css?v=d41d8cd98f"));
        assert!(urls.get("missing.css").unwrap().starts_with("/calypso/missing.css?v="));
        assert_eq!(urls.get("build"), Some("/calypso/build.js"));
        assert_eq!(urls.get("build-min"), Some("/calypso/build.m.js"));
        assert_eq!(urls.get("_vendor"), Some("/calypso/vendor.abc.js"));
        assert_eq!(urls.get("_vendor-min"), Some("/calypso/vendor.abc.m.js"));
    }

    #[test]
    fn test_no_minified_variants_in_development() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir, false, vec![BundleAsset::named("build", "/calypso/build.js")]);
        let urls = resolver.resolve();
        assert_eq!(urls.get("build"), Some("/calypso/build.js"));
        assert_eq!(urls.get("build-min"), None);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();
        let resolver = resolver(&dir, true, vec![BundleAsset::named("build", "/calypso/build.js")]);

        // Includes the timestamp-versioned missing file: cached after first use.
        assert_eq!(resolver.resolve(), resolver.resolve());
        assert_eq!(resolver.cache().len(), 2);
    }
}
