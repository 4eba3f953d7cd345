//! Session gate.
//!
//! # States
//! ```text
//! no session cookie ─────────────→ LoggedOut (default context)
//! session cookie ─→ Checking ─┬──→ Resolved (user merged) / Anonymous (bootstrap off)
//!                             ├──→ AuthRequired (302 to login)
//!                             └──→ Error (500 view)
//! ```
//!
//! # Design Decisions
//! - Logged-out requests never reach the identity service
//! - One lookup per request, bounded by the client's timeout, never retried
//! - Legacy root query redirects only run once the user is known

use axum::http::StatusCode;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::config::ServerConfig;
use crate::http::context::{ContextBuilder, RequestContext};
use crate::http::request::PageRequest;
use crate::http::response;
use crate::identity::{IdentityError, IdentityService};
use crate::observability::metrics;
use crate::render::{Renderer, View};

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How a request that passed the gate was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// No session cookie.
    LoggedOut,
    /// Session cookie present, user bootstrap disabled.
    LoggedInAnonymous,
    /// Session cookie present, user fetched and merged.
    LoggedInResolved,
}

/// Result of running the gate.
#[derive(Debug)]
pub enum GateOutcome {
    /// Continue to the renderer with this context.
    Proceed {
        decision: AuthDecision,
        context: RequestContext,
    },
    /// The gate answered the request itself.
    Respond(axum::response::Response),
}

/// Classifies requests and bootstraps the user for logged-in ones.
pub struct AuthGate {
    config: Arc<ServerConfig>,
    contexts: Arc<ContextBuilder>,
    identity: Arc<dyn IdentityService>,
    renderer: Arc<dyn Renderer>,
    login_url: Url,
}

impl AuthGate {
    pub fn new(
        config: Arc<ServerConfig>,
        contexts: Arc<ContextBuilder>,
        identity: Arc<dyn IdentityService>,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, url::ParseError> {
        let login_url = Url::parse(&config.auth.login_url)?;
        Ok(Self {
            config,
            contexts,
            identity,
            renderer,
            login_url,
        })
    }

    /// True if the request carries the session cookie.
    pub fn is_logged_in(&self, request: &PageRequest) -> bool {
        request.has_cookie(&self.config.auth.session_cookie)
    }

    /// Gate for routes open to everyone: the cookie picks the path.
    pub async fn set_up_route(&self, request: &PageRequest) -> GateOutcome {
        if self.is_logged_in(request) {
            self.set_up_logged_in_route(request).await
        } else {
            GateOutcome::Proceed {
                decision: AuthDecision::LoggedOut,
                context: self.contexts.build(request),
            }
        }
    }

    /// Gate for routes that need a session.
    pub async fn set_up_logged_in_route(&self, request: &PageRequest) -> GateOutcome {
        let mut context = self.contexts.build(request);

        if !self.config.auth.user_bootstrap {
            return GateOutcome::Proceed {
                decision: AuthDecision::LoggedInAnonymous,
                context,
            };
        }

        let login = self.login_redirect_url(request);

        let cookie_header = match request.cookie_header() {
            Some(header) if self.is_logged_in(request) => header,
            _ => {
                tracing::debug!(redirect = %login, "User not logged in, redirecting to login");
                return GateOutcome::Respond(response::found(&login));
            }
        };

        let start = Instant::now();
        tracing::debug!(request_id = %request.request_id(), "Fetching user from identity service");

        let user = match self.identity.fetch_user(&cookie_header).await {
            Ok(user) => {
                metrics::record_identity_lookup("ok", start);
                user
            }
            Err(IdentityError::AuthorizationRequired) => {
                metrics::record_identity_lookup("authorization_required", start);
                tracing::debug!(redirect = %login, "Identity service requires authorization, redirecting to login");
                return GateOutcome::Respond(response::found(&login));
            }
            Err(e) => {
                metrics::record_identity_lookup(e.label(), start);
                tracing::error!(request_id = %request.request_id(), error = %e, "Identity lookup failed");
                let rendered = self.renderer.render(&View::ServerError { context: &context });
                return GateOutcome::Respond(response::html(StatusCode::INTERNAL_SERVER_ERROR, rendered));
            }
        };

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendering with bootstrapped user"
        );
        context.merge_user(user);

        if request.path() == "/" {
            if let Some(target) = self.legacy_root_redirect(request, &context.lang) {
                return GateOutcome::Respond(response::found(&target));
            }
        }

        GateOutcome::Proceed {
            decision: AuthDecision::LoggedInResolved,
            context,
        }
    }

    /// Login URL that sends the visitor back to the current page.
    pub fn login_redirect_url(&self, request: &PageRequest) -> String {
        let redirect_to = format!(
            "{}://{}{}",
            request.forwarded_proto(),
            self.config.hostname,
            request.original_url()
        );
        let mut url = self.login_url.clone();
        url.query_pairs_mut().append_pair("redirect_to", &redirect_to);
        url.to_string()
    }

    /// Old root-URL query actions: search, email verification, invite acceptance.
    fn legacy_root_redirect(&self, request: &PageRequest, lang: &str) -> Option<String> {
        let redirects = &self.config.redirects;

        let search = request
            .query_value("s")
            .filter(|s| !s.is_empty())
            .or_else(|| request.query_value("q").filter(|q| !q.is_empty()));
        if let Some(term) = search {
            let subdomain = if is_locale_slug(lang) {
                lang
            } else {
                tracing::warn!(lang = %lang, "Ignoring malformed locale for search redirect");
                self.config.i18n.default_locale_slug.as_str()
            };
            return Some(format!(
                "https://{}.{}/?q={}",
                subdomain,
                redirects.search_host,
                utf8_percent_encode(&term, URI_COMPONENT)
            ));
        }

        let query = || {
            url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(request.query_pairs())
                .finish()
        };

        if request.query_value("newuseremail").is_some_and(|v| !v.is_empty()) {
            tracing::debug!("Legacy email verification action, redirecting");
            return Some(format!("{}?{}", redirects.verify_email_url, query()));
        }

        if request.query_value("action").as_deref() == Some("wpcom-invite-users") {
            tracing::debug!("Legacy invite acceptance action, redirecting");
            return Some(format!("{}?{}", redirects.accept_invite_url, query()));
        }

        None
    }
}

/// Locale slugs are used as host labels: `[a-z0-9-]+` only.
fn is_locale_slug(lang: &str) -> bool {
    !lang.is_empty()
        && lang
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetResolver, BundleManifestStore};
    use crate::identity::{ApiError, User};
    use crate::render::ShellRenderer;
    use axum::http::{header, HeaderMap, HeaderValue};
    use futures_util::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Identity stub returning a canned result and counting calls.
    struct StubIdentity {
        calls: AtomicUsize,
        cookies: Mutex<Vec<String>>,
        result: fn() -> Result<User, IdentityError>,
    }

    impl StubIdentity {
        fn new(result: fn() -> Result<User, IdentityError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                cookies: Mutex::new(Vec::new()),
                result,
            })
        }
    }

    impl IdentityService for StubIdentity {
        fn fetch_user<'a>(&'a self, cookie_header: &'a str) -> BoxFuture<'a, Result<User, IdentityError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.cookies.lock().unwrap().push(cookie_header.to_string());
            let result = (self.result)();
            Box::pin(async move { result })
        }
    }

    fn french_user() -> Result<User, IdentityError> {
        Ok(serde_json::from_str(r#"{"ID":1,"localeSlug":"fr"}"#).unwrap())
    }

    fn gate(config: ServerConfig, identity: Arc<StubIdentity>) -> AuthGate {
        let config = Arc::new(config);
        let assets = Arc::new(AssetResolver::new(
            &config.assets,
            false,
            Arc::new(BundleManifestStore::from_assets(Vec::new())),
        ));
        let contexts = Arc::new(ContextBuilder::new(config.clone(), assets));
        AuthGate::new(config, contexts, identity, Arc::new(ShellRenderer::default())).unwrap()
    }

    fn request(uri: &str, cookie: Option<&str>) -> PageRequest {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        PageRequest::new(uri.parse().unwrap(), headers, None)
    }

    fn location(outcome: GateOutcome) -> String {
        match outcome {
            GateOutcome::Respond(response) => {
                assert_eq!(response.status(), StatusCode::FOUND);
                response.headers()[header::LOCATION].to_str().unwrap().to_string()
            }
            GateOutcome::Proceed { decision, .. } => panic!("expected redirect, got {:?}", decision),
        }
    }

    #[tokio::test]
    async fn test_logged_out_makes_no_lookup() {
        let identity = StubIdentity::new(french_user);
        let gate = gate(ServerConfig::default(), identity.clone());

        match gate.set_up_route(&request("/", None)).await {
            GateOutcome::Proceed { decision, context } => {
                assert_eq!(decision, AuthDecision::LoggedOut);
                assert!(context.user.is_none());
            }
            GateOutcome::Respond(_) => panic!("logged-out request must proceed"),
        }
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_disabled_is_anonymous() {
        let identity = StubIdentity::new(french_user);
        let mut config = ServerConfig::default();
        config.auth.user_bootstrap = false;
        let gate = gate(config, identity.clone());

        match gate.set_up_route(&request("/", Some("wordpress_logged_in=abc"))).await {
            GateOutcome::Proceed { decision, context } => {
                assert_eq!(decision, AuthDecision::LoggedInAnonymous);
                assert!(context.user.is_none());
            }
            GateOutcome::Respond(_) => panic!("bootstrap disabled must not redirect"),
        }
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_logged_in_route_without_cookie_redirects_to_login() {
        let identity = StubIdentity::new(french_user);
        let mut config = ServerConfig::default();
        config.hostname = "wordpress.com".into();
        let gate = gate(config, identity.clone());

        let mut req = request("/stats?period=day", None);
        let target = location(gate.set_up_logged_in_route(&req).await);
        assert_eq!(
            target,
            "https://wordpress.com/wp-login.php?redirect_to=http%3A%2F%2Fwordpress.com%2Fstats%3Fperiod%3Dday"
        );

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        req = PageRequest::new("/stats".parse().unwrap(), headers, None);
        assert!(location(gate.set_up_logged_in_route(&req).await).ends_with("https%3A%2F%2Fwordpress.com%2Fstats"));
        assert_eq!(identity.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolved_user_is_merged() {
        let identity = StubIdentity::new(french_user);
        let gate = gate(ServerConfig::default(), identity.clone());

        match gate.set_up_route(&request("/read", Some("wordpress_logged_in=abc; other=1"))).await {
            GateOutcome::Proceed { decision, context } => {
                assert_eq!(decision, AuthDecision::LoggedInResolved);
                assert_eq!(context.lang, "fr");
                assert!(context.user.is_some());
            }
            GateOutcome::Respond(_) => panic!("resolved user must proceed"),
        }
        assert_eq!(identity.calls.load(Ordering::SeqCst), 1);
        assert_eq!(identity.cookies.lock().unwrap()[0], "wordpress_logged_in=abc; other=1");
    }

    #[tokio::test]
    async fn test_search_redirect_uses_user_locale() {
        let gate = gate(ServerConfig::default(), StubIdentity::new(french_user));
        let target = location(gate.set_up_route(&request("/?s=hello%20world", Some("wordpress_logged_in=abc"))).await);
        assert_eq!(target, "https://fr.search.wordpress.com/?q=hello%20world");

        let target = location(gate.set_up_route(&request("/?q=caf%C3%A9", Some("wordpress_logged_in=abc"))).await);
        assert_eq!(target, "https://fr.search.wordpress.com/?q=caf%C3%A9");
    }

    #[tokio::test]
    async fn test_search_redirect_rejects_malformed_locale() {
        let gate = gate(
            ServerConfig::default(),
            StubIdentity::new(|| Ok(serde_json::from_str(r#"{"localeSlug":"evil.com/x"}"#).unwrap())),
        );
        let target = location(gate.set_up_route(&request("/?s=hello", Some("wordpress_logged_in=abc"))).await);
        assert_eq!(target, "https://en.search.wordpress.com/?q=hello");

        assert!(is_locale_slug("pt-br"));
        assert!(!is_locale_slug("EN"));
        assert!(!is_locale_slug(""));
    }

    #[tokio::test]
    async fn test_legacy_actions() {
        let gate = gate(ServerConfig::default(), StubIdentity::new(french_user));
        let cookie = Some("wordpress_logged_in=abc");

        let target = location(gate.set_up_route(&request("/?newuseremail=a%40b.c&key=1", cookie)).await);
        assert_eq!(target, "https://wordpress.com/verify-email/?newuseremail=a%40b.c&key=1");

        let target = location(gate.set_up_route(&request("/?action=wpcom-invite-users&invite=9", cookie)).await);
        assert_eq!(target, "https://wordpress.com/accept-invite/?action=wpcom-invite-users&invite=9");

        // Only the root path is rewritten.
        assert!(matches!(
            gate.set_up_route(&request("/read?s=hello", cookie)).await,
            GateOutcome::Proceed { .. }
        ));
    }

    #[tokio::test]
    async fn test_authorization_required_redirects() {
        let gate = gate(ServerConfig::default(), StubIdentity::new(|| Err(IdentityError::AuthorizationRequired)));
        let target = location(gate.set_up_route(&request("/me", Some("wordpress_logged_in=stale"))).await);
        assert!(target.starts_with("https://wordpress.com/wp-login.php?redirect_to="));
    }

    #[tokio::test]
    async fn test_other_errors_render_500() {
        let gate = gate(
            ServerConfig::default(),
            StubIdentity::new(|| {
                Err(IdentityError::Api(ApiError {
                    code: Some("unknown".into()),
                    message: Some("boom".into()),
                }))
            }),
        );
        match gate.set_up_route(&request("/me", Some("wordpress_logged_in=abc"))).await {
            GateOutcome::Respond(response) => assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR),
            GateOutcome::Proceed { .. } => panic!("errors must not proceed"),
        }
    }
}
