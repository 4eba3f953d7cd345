//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the page handler
//! - Wire up middleware (tracing, timeout, request ID, frame options)
//! - Assemble the pipeline: assets, contexts, session gate, sections
//! - Bind server to listener and shut down gracefully

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    response::Response,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::assets::manifest::ManifestError;
use crate::assets::watcher::ManifestWatcher;
use crate::assets::{AssetResolver, BundleManifestStore};
use crate::config::ServerConfig;
use crate::http::auth::AuthGate;
use crate::http::context::ContextBuilder;
use crate::http::dispatch::Dispatcher;
use crate::http::request::PageRequest;
use crate::identity::{HttpIdentityClient, IdentityService};
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::observability::metrics;
use crate::render::{Renderer, ShellRenderer};
use crate::sections::{build_registry, RegistryError};

/// Error raised while assembling the server.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("failed to build identity client: {0}")]
    IdentityClient(#[from] reqwest::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid login URL: {0}")]
    LoginUrl(#[from] url::ParseError),
}

/// Collaborators the pipeline talks to.
#[derive(Clone)]
pub struct Services {
    pub identity: Arc<dyn IdentityService>,
    pub renderer: Arc<dyn Renderer>,
    pub bundles: Arc<BundleManifestStore>,
}

impl Services {
    /// HTTP identity client, shell renderer and the configured bundle manifest.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let bundles = match &config.assets.bundle_manifest {
            Some(path) => BundleManifestStore::open(Path::new(path))?,
            None => BundleManifestStore::from_assets(Vec::new()),
        };
        Ok(Self {
            identity: Arc::new(HttpIdentityClient::new(&config.identity)?),
            renderer: Arc::new(ShellRenderer::default()),
            bundles: Arc::new(bundles),
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the page pipeline.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    bundles: Arc<BundleManifestStore>,
}

impl HttpServer {
    /// Create a server with the default collaborators.
    pub fn new(config: ServerConfig) -> Result<Self, StartupError> {
        let services = Services::from_config(&config)?;
        Self::with_services(config, services)
    }

    /// Create a server with explicit collaborators.
    pub fn with_services(config: ServerConfig, services: Services) -> Result<Self, StartupError> {
        let config = Arc::new(config);

        let assets = Arc::new(AssetResolver::new(
            &config.assets,
            !config.is_development(),
            services.bundles.clone(),
        ));
        let contexts = Arc::new(ContextBuilder::new(config.clone(), assets));
        let gate = AuthGate::new(
            config.clone(),
            contexts.clone(),
            services.identity,
            services.renderer.clone(),
        )?;
        let registry = build_registry(&config)?;

        let dispatcher = Arc::new(Dispatcher::new(
            config.clone(),
            registry,
            gate,
            contexts,
            services.renderer,
        ));

        let router = Self::build_router(&config, AppState { dispatcher });
        Ok(Self {
            router,
            config,
            bundles: services.bundles,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(page_handler))
            .route("/{*path}", get(page_handler))
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("SAMEORIGIN"),
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires or the process is signalled.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            env = %self.config.env,
            "HTTP server starting"
        );

        // Held for the lifetime of the server.
        let _watcher = if self.config.assets.watch_bundle_manifest {
            match ManifestWatcher::new(self.bundles.clone()).run() {
                Ok(watcher) => watcher,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to watch bundle manifest");
                    None
                }
            }
        } else {
            None
        };

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Page handler: every GET request goes through the dispatcher.
async fn page_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let page_request = PageRequest::from_request(&request);

    let response = state.dispatcher.dispatch(&page_request).await;

    tracing::debug!(
        request_id = %page_request.request_id(),
        path = %page_request.path(),
        status = response.status().as_u16(),
        "Request handled"
    );
    metrics::record_request(response.status().as_u16(), start);
    response
}
