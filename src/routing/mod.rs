//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → table.rs (ordered route walk)
//!     → pattern.rs (evaluate path pattern, extract params)
//!     → Return: every matching route in registration order
//!
//! Route Compilation (at startup):
//!     section manifest + fixed redirects
//!     → sections::registrar builds the ordered table
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex: segment comparison only
//! - Deterministic: same input always walks the same routes
//! - First route that answers wins; a route may pass to the next one

pub mod legacy;
pub mod pattern;
pub mod table;

pub use pattern::{PathParams, PathPattern};
pub use table::{RouteTable, RouteTarget};
