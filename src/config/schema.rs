//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the page
//! server. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::sections::defaults::default_sections;

/// Name of the development environment.
pub const DEVELOPMENT_ENV: &str = "development";

/// Root configuration for the page server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Environment name (`development`, `stage`, `production`, ...).
    pub env: String,

    /// Deployment id used to filter sections with `env_ids`.
    pub env_id: String,

    /// Public hostname used to build absolute redirect targets.
    pub hostname: String,

    /// Feature flags, looked up by name.
    pub features: BTreeMap<String, bool>,

    /// Locale defaults.
    pub i18n: I18nConfig,

    /// Session cookie and login settings.
    pub auth: AuthConfig,

    /// Remote identity service.
    pub identity: IdentityConfig,

    /// External redirect targets.
    pub redirects: RedirectConfig,

    /// Static asset and bundle manifest settings.
    pub assets: AssetConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Section manifest, in registration order.
    pub sections: Vec<SectionConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            env: DEVELOPMENT_ENV.to_string(),
            env_id: "desktop".to_string(),
            hostname: "calypso.localhost:3000".to_string(),
            features: BTreeMap::new(),
            i18n: I18nConfig::default(),
            auth: AuthConfig::default(),
            identity: IdentityConfig::default(),
            redirects: RedirectConfig::default(),
            assets: AssetConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            sections: default_sections(),
        }
    }
}

impl ServerConfig {
    /// Returns true if the named feature flag is enabled.
    pub fn is_enabled(&self, feature: &str) -> bool {
        self.features.get(feature).copied().unwrap_or(false)
    }

    /// Returns true when running in the development environment.
    pub fn is_development(&self) -> bool {
        self.env == DEVELOPMENT_ENV
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Locale defaults applied before the user's own preferences.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Default locale slug (e.g., "en").
    pub default_locale_slug: String,

    /// Default text direction.
    pub rtl: bool,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale_slug: "en".to_string(),
            rtl: false,
        }
    }
}

/// Session and login configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Cookie whose presence marks a request as logged in.
    pub session_cookie: String,

    /// External login endpoint.
    pub login_url: String,

    /// Fetch the user object from the identity service for logged-in requests.
    pub user_bootstrap: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie: "wordpress_logged_in".to_string(),
            login_url: "https://wordpress.com/wp-login.php".to_string(),
            user_bootstrap: true,
        }
    }
}

/// Remote identity service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Endpoint returning the current user for a cookie header.
    pub url: String,

    /// Upper bound for a single lookup in seconds.
    pub timeout_secs: u64,

    /// User agent sent with lookups.
    pub user_agent: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: "https://public-api.wordpress.com/rest/v1.1/me?meta=flags".to_string(),
            timeout_secs: 10,
            user_agent: concat!("page-bootstrap/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// External redirect targets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Where logged-out visitors of `/discover` are sent.
    pub discover_logged_out_url: String,

    /// Search host; the user's locale is prepended as a subdomain.
    pub search_host: String,

    /// Legacy email verification target.
    pub verify_email_url: String,

    /// Legacy invite acceptance target.
    pub accept_invite_url: String,

    /// Where logged-out visitors of `/plans` are sent.
    pub plans_logged_out_url: String,

    /// Where logged-out visitors of `/plans?for=jetpack` are sent.
    pub plans_jetpack_url: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            discover_logged_out_url: "https://discover.wordpress.com".to_string(),
            search_host: "search.wordpress.com".to_string(),
            verify_email_url: "https://wordpress.com/verify-email/".to_string(),
            accept_invite_url: "https://wordpress.com/accept-invite/".to_string(),
            plans_logged_out_url: "https://wordpress.com/pricing".to_string(),
            plans_jetpack_url:
                "https://wordpress.com/wp-login.php?redirect_to=https%3A%2F%2Fwordpress.com%2Fplans"
                    .to_string(),
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory static files are read from for hashing.
    pub public_dir: String,

    /// URL prefix static files and bundles are served under.
    pub url_prefix: String,

    /// Static files that receive a content-hash version token.
    pub static_files: Vec<String>,

    /// Bundler manifest (JSON array of `{name?, url}`).
    pub bundle_manifest: Option<String>,

    /// Reload the bundle manifest when the file changes.
    pub watch_bundle_manifest: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            public_dir: "public".to_string(),
            url_prefix: "/calypso/".to_string(),
            static_files: vec![
                "style.css".to_string(),
                "editor.css".to_string(),
                "tinymce/skins/wordpress/wp-content.css".to_string(),
                "style-debug.css".to_string(),
                "style-rtl.css".to_string(),
            ],
            bundle_manifest: None,
            watch_bundle_manifest: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One section manifest entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SectionConfig {
    /// Section name; doubles as the view and chunk name.
    pub name: String,

    /// Express-style path patterns (`/sites/:site`).
    pub paths: Vec<String>,

    /// Module reference; for isomorphic sections this selects the sub-router.
    pub module: String,

    /// Section supplies its own sub-router.
    #[serde(default)]
    pub isomorphic: bool,

    /// Section renders for logged-out visitors.
    #[serde(default)]
    pub enable_logged_out: bool,

    /// Restrict the section to these deployment ids.
    #[serde(default)]
    pub env_ids: Option<Vec<String>>,
}

impl SectionConfig {
    /// Returns true if the section is registered for the given deployment id.
    pub fn is_available_in(&self, env_id: &str) -> bool {
        match &self.env_ids {
            Some(ids) => ids.iter().any(|id| id == env_id),
            None => true,
        }
    }
}
