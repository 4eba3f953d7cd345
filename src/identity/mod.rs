//! Remote identity lookup.
//!
//! # Data Flow
//! ```text
//! raw Cookie header
//!     → client.rs (one GET to the identity service, bounded by a timeout)
//!     → types.rs (User | AuthorizationRequired | Api error | Timeout | Transport)
//! ```
//!
//! # Design Decisions
//! - Exactly one call per request; no retries
//! - The trait seam lets the page pipeline run against a stub in tests

pub mod client;
pub mod types;

pub use client::{HttpIdentityClient, IdentityService};
pub use types::{ApiError, IdentityError, User, AUTHORIZATION_REQUIRED};
