//! HTTP page pipeline.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, trace, timeout, frame options)
//!     → request.rs (capture uri, headers, client address)
//!     → dispatch.rs (ordered route walk)
//!         → auth.rs (session gate, identity lookup)
//!         → context.rs (default context, user merge)
//!     → response.rs (redirect or rendered view)
//!     → Send to client
//! ```

pub mod auth;
pub mod context;
pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use request::{PageRequest, X_REQUEST_ID};
pub use server::{HttpServer, Services, StartupError};
