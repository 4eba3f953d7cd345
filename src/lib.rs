//! Page bootstrap server library.
//!
//! Fronts a single-page application: versions static assets, gates pages on
//! the session cookie, bootstraps the user from an identity service, applies
//! legacy redirects and renders the section shell.

pub mod assets;
pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod sections;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
