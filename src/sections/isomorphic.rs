//! Typed sub-router interface for isomorphic sections.
//!
//! An isomorphic section declares its own routes and the context
//! middleware each route runs. The registrar wraps every route with the
//! session gate and the shared renderer.

use std::sync::Arc;

use crate::http::context::RequestContext;
use crate::routing::pattern::{PathParams, PathPattern, PatternError};
use crate::sections::themes::ThemesSection;

/// Adjusts the context of a matched sub-route before rendering.
pub type ContextMiddleware = Arc<dyn Fn(&mut RequestContext, &PathParams) + Send + Sync>;

/// One route declared by an isomorphic section.
#[derive(Clone)]
pub struct SectionRoute {
    pub pattern: PathPattern,
    pub middleware: Vec<ContextMiddleware>,
}

impl SectionRoute {
    /// Run the route's middleware in declaration order.
    pub fn apply(&self, context: &mut RequestContext, params: &PathParams) {
        for middleware in &self.middleware {
            middleware(context, params);
        }
    }
}

impl std::fmt::Debug for SectionRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionRoute")
            .field("pattern", &self.pattern)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Collects the routes an isomorphic section registers.
#[derive(Default)]
pub struct SectionRouter {
    routes: Vec<SectionRoute>,
    errors: Vec<PatternError>,
}

impl SectionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` with a single middleware.
    pub fn route<F>(&mut self, path: &str, middleware: F) -> &mut Self
    where
        F: Fn(&mut RequestContext, &PathParams) + Send + Sync + 'static,
    {
        let middleware: ContextMiddleware = Arc::new(middleware);
        self.route_with(path, vec![middleware])
    }

    /// Register `path` with a middleware chain.
    pub fn route_with(&mut self, path: &str, middleware: Vec<ContextMiddleware>) -> &mut Self {
        match PathPattern::exact(path) {
            Ok(pattern) => self.routes.push(SectionRoute { pattern, middleware }),
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// The registered routes, or the first malformed pattern.
    pub fn into_routes(self) -> Result<Vec<SectionRoute>, PatternError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(self.routes),
        }
    }
}

/// A section that supplies its own sub-router.
pub trait IsomorphicSection: Send + Sync {
    fn register(&self, router: &mut SectionRouter);
}

/// Resolve an isomorphic module by name.
pub fn resolve_module(module: &str) -> Option<Arc<dyn IsomorphicSection>> {
    match module {
        "themes" => Some(Arc::new(ThemesSection)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_collects_routes() {
        let mut router = SectionRouter::new();
        router
            .route("/a", |_, _| {})
            .route_with("/a/:id", Vec::new());
        let routes = router.into_routes().unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[1].pattern.as_str(), "/a/:id");
    }

    #[test]
    fn test_router_reports_bad_pattern() {
        let mut router = SectionRouter::new();
        router.route("relative", |_, _| {});
        assert!(router.into_routes().is_err());
    }

    #[test]
    fn test_resolve_module() {
        assert!(resolve_module("themes").is_some());
        assert!(resolve_module("woocommerce").is_none());
    }
}
