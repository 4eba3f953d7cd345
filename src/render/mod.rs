//! View rendering.
//!
//! The page server does not render the UI itself. It renders a shell
//! document per view that loads the client bundles and hands them the
//! request context.

pub mod shell;

use thiserror::Error;

use crate::assets::StaticAssetMap;
use crate::http::context::RequestContext;

pub use shell::ShellRenderer;

/// A named view and the inputs it is rendered with.
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    /// A section page.
    Section {
        name: &'a str,
        context: &'a RequestContext,
    },
    /// The `500` view.
    ServerError { context: &'a RequestContext },
    /// The `404` view; only receives the asset URLs.
    NotFound { urls: &'a StaticAssetMap },
}

impl View<'_> {
    /// Template name of the view.
    pub fn template(&self) -> &str {
        match self {
            View::Section { name, .. } => *name,
            View::ServerError { .. } => "500",
            View::NotFound { .. } => "404",
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize view context: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Turns a view into an HTML document.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError>;
}
