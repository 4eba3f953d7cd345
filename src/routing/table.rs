//! Ordered route table.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Yield every route matching a path, in order
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan; route counts are small
//! - No match is not an error; the caller falls back to 404

use crate::routing::pattern::{PathParams, PathPattern};

/// What a route does when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// `/` → `/stats` when the reader is disabled.
    HomeRedirect,
    /// Legacy `/sites/:site/:section` rewriter.
    LegacySites,
    /// Logged-out `/discover` redirect.
    DiscoverRedirect,
    /// Logged-out `/plans` redirect.
    PlansRedirect,
    /// `/theme` → `/design`.
    ThemeRedirect,
    /// Plain section rendered by the shared renderer.
    Section { section: usize },
    /// Route registered by an isomorphic section's sub-router.
    SectionRoute { section: usize, route: usize },
}

/// A single compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: PathPattern,
    pub target: RouteTarget,
}

/// Routes in registration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route; later routes only run when earlier ones pass.
    pub fn push(&mut self, pattern: PathPattern, target: RouteTarget) {
        self.routes.push(Route { pattern, target });
    }

    /// Every route matching `path`, in registration order.
    pub fn matches<'a>(&'a self, path: &'a str) -> impl Iterator<Item = (&'a Route, PathParams)> + 'a {
        self.routes
            .iter()
            .filter_map(move |route| route.pattern.matches(path).map(|params| (route, params)))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
