//! Page request dispatch.
//!
//! # Responsibilities
//! - Walk the route table in order for each request
//! - Run redirects, the session gate and the renderer for the matched route
//! - Fall back to the 404 view when no route answers
//!
//! # Design Decisions
//! - A route either answers or passes; the first answer ends the walk
//! - Sections always answer (render, redirect or error)

use axum::http::StatusCode;
use axum::response::Response;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::http::auth::{AuthGate, GateOutcome};
use crate::http::context::ContextBuilder;
use crate::http::request::PageRequest;
use crate::http::response;
use crate::render::{Renderer, View};
use crate::routing::legacy;
use crate::routing::pattern::PathParams;
use crate::routing::table::RouteTarget;
use crate::sections::{SectionEntry, SectionRegistry, SectionRoute};

/// Outcome of a single route.
pub enum Flow {
    /// Pass to the next matching route.
    Next,
    /// The route answered.
    Respond(Response),
}

/// Answers page requests.
pub struct Dispatcher {
    config: Arc<ServerConfig>,
    registry: SectionRegistry,
    gate: AuthGate,
    contexts: Arc<ContextBuilder>,
    renderer: Arc<dyn Renderer>,
}

impl Dispatcher {
    pub fn new(
        config: Arc<ServerConfig>,
        registry: SectionRegistry,
        gate: AuthGate,
        contexts: Arc<ContextBuilder>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            config,
            registry,
            gate,
            contexts,
            renderer,
        }
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// Run the first route that answers, or render 404.
    pub async fn dispatch(&self, request: &PageRequest) -> Response {
        for (route, params) in self.registry.table().matches(request.path()) {
            if let Flow::Respond(response) = self.run(route.target, &params, request).await {
                return response;
            }
        }
        self.not_found(request)
    }

    async fn run(&self, target: RouteTarget, params: &PathParams, request: &PageRequest) -> Flow {
        match target {
            RouteTarget::HomeRedirect => Flow::Respond(response::found("/stats")),
            RouteTarget::LegacySites => match legacy::rewrite(params, request.query()) {
                Some(location) => {
                    tracing::debug!(from = %request.original_url(), to = %location, "Legacy sites URL rewritten");
                    Flow::Respond(response::found(&location))
                }
                None => Flow::Next,
            },
            RouteTarget::DiscoverRedirect => {
                if self.gate.is_logged_in(request) {
                    Flow::Next
                } else {
                    Flow::Respond(response::found(&self.config.redirects.discover_logged_out_url))
                }
            }
            RouteTarget::PlansRedirect => {
                if self.gate.is_logged_in(request) {
                    Flow::Next
                } else if request.query_value("for").as_deref() == Some("jetpack") {
                    Flow::Respond(response::found(&self.config.redirects.plans_jetpack_url))
                } else {
                    Flow::Respond(response::found(&self.config.redirects.plans_logged_out_url))
                }
            }
            RouteTarget::ThemeRedirect => Flow::Respond(response::found("/design")),
            RouteTarget::Section { section } => match self.registry.section(section) {
                Some(entry) => Flow::Respond(self.render_section(entry, None, params, request).await),
                None => Flow::Next,
            },
            RouteTarget::SectionRoute { section, route } => {
                let Some(entry) = self.registry.section(section) else {
                    return Flow::Next;
                };
                match entry.routes.get(route) {
                    Some(sub) => Flow::Respond(self.render_section(entry, Some(sub), params, request).await),
                    None => Flow::Next,
                }
            }
        }
    }

    /// Gate, annotate and render a section page.
    async fn render_section(
        &self,
        section: &SectionEntry,
        sub_route: Option<&SectionRoute>,
        params: &PathParams,
        request: &PageRequest,
    ) -> Response {
        let outcome = if section.isomorphic || section.enable_logged_out {
            self.gate.set_up_route(request).await
        } else {
            self.gate.set_up_logged_in_route(request).await
        };

        let (decision, mut context) = match outcome {
            GateOutcome::Proceed { decision, context } => (decision, context),
            GateOutcome::Respond(response) => return response,
        };

        if self.config.is_enabled("code-splitting") {
            context.chunk = Some(section.name.clone());
        }
        if let Some(sub_route) = sub_route {
            sub_route.apply(&mut context, params);
        }

        tracing::debug!(
            request_id = %request.request_id(),
            section = %section.name,
            decision = ?decision,
            "Rendering section"
        );

        let rendered = self.renderer.render(&View::Section {
            name: &section.name,
            context: &context,
        });
        response::html(StatusCode::OK, rendered)
    }

    fn not_found(&self, request: &PageRequest) -> Response {
        tracing::debug!(path = %request.path(), "No route matched");
        let urls = self.contexts.asset_urls();
        let rendered = self.renderer.render(&View::NotFound { urls: &urls });
        response::html(StatusCode::NOT_FOUND, rendered)
    }
}
