//! Section manifest and route registration.
//!
//! # Data Flow
//! ```text
//! SectionConfig[] (config file or defaults.rs)
//!     → registrar.rs (filter by env id, compile patterns, fixed redirects first)
//!     → isomorphic.rs (typed sub-routers for isomorphic sections)
//!     → SectionRegistry { RouteTable, sections } (immutable)
//! ```
//!
//! # Design Decisions
//! - Registration happens once at startup
//! - Isomorphic modules are resolved from a static table, not loaded at runtime
//! - The 404 fallback is implicit: it runs when no route answers

pub mod defaults;
pub mod isomorphic;
pub mod registrar;
pub mod themes;

pub use isomorphic::{IsomorphicSection, SectionRoute, SectionRouter};
pub use registrar::{build_registry, RegistryError, SectionEntry, SectionRegistry};
