//! Static asset URL subsystem.
//!
//! # Data Flow
//! ```text
//! configured static files ─→ version.rs (MD5 token, process-lifetime cache) ─┐
//!                                                                           ├─→ resolver.rs → StaticAssetMap
//! bundler manifest (JSON) ─→ manifest.rs (ArcSwap snapshot) ────────────────┘
//!                              ↑
//!                         watcher.rs (reload on change)
//! ```
//!
//! # Design Decisions
//! - Version tokens are computed once per file and never evicted
//! - A missing file still gets a token (timestamp), never an error
//! - The bundle manifest is swapped atomically; readers see whole snapshots

pub mod manifest;
pub mod resolver;
pub mod version;
pub mod watcher;

pub use manifest::{BundleAsset, BundleManifestStore};
pub use resolver::{AssetResolver, StaticAssetMap};
pub use version::VersionCache;
