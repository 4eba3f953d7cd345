//! Per-request rendering context.
//!
//! # Responsibilities
//! - Build the default context every page starts from
//! - Derive the `app` block (client address, debug flag, editor styles)
//! - Apply environment badges
//!
//! # Design Decisions
//! - A context is built fresh for every request and never shared
//! - `user` serializes as `false` until a user is bootstrapped

use serde::{Serialize, Serializer};
use std::net::IpAddr;
use std::sync::Arc;

use crate::assets::{AssetResolver, StaticAssetMap};
use crate::config::ServerConfig;
use crate::http::request::PageRequest;
use crate::identity::User;

/// Asset names the editor loads its styles from.
pub const EDITOR_STYLESHEETS: &[&str] = &["editor.css", "tinymce/skins/wordpress/wp-content.css"];

const DEFAULT_FAVICON: &str = "//s1.wp.com/i/favicon.ico";
const FEEDBACK_URL: &str = "https://github.com/Automattic/wp-calypso/issues/";

/// Client application state seeded on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StateStore(serde_json::Map<String, serde_json::Value>);

impl StateStore {
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Values the client application reads at boot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppContext {
    pub client_ip: Option<String>,
    pub is_debug: bool,
    pub static_urls: Vec<String>,
}

/// Everything a view is rendered with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub compile_debug: bool,
    pub urls: StaticAssetMap,
    #[serde(serialize_with = "user_or_false")]
    pub user: Option<User>,
    pub env: String,
    #[serde(rename = "isRTL")]
    pub is_rtl: bool,
    pub is_debug: bool,
    pub lang: String,
    pub badge: Option<String>,
    #[serde(rename = "faviconURL")]
    pub favicon_url: String,
    #[serde(rename = "feedbackURL")]
    pub feedback_url: Option<String>,
    pub dev_docs: bool,
    pub is_fluid_width: bool,
    pub chunk: Option<String>,
    pub app: AppContext,
    #[serde(rename = "initialState")]
    pub store: StateStore,
}

impl RequestContext {
    /// Merge a bootstrapped user: locale preference and text direction.
    pub fn merge_user(&mut self, user: User) {
        if let Some(locale) = user.locale() {
            self.lang = locale.to_string();
        }
        self.is_rtl = user.is_rtl();
        self.user = Some(user);
    }
}

fn user_or_false<S: Serializer>(user: &Option<User>, serializer: S) -> Result<S::Ok, S::Error> {
    match user {
        Some(user) => user.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

/// Strip the IPv4-mapped-IPv6 prefix (`::ffff:1.2.3.4` → `1.2.3.4`).
pub fn display_ip(ip: IpAddr) -> String {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        IpAddr::V4(v4) => v4.to_string(),
    }
}

/// Builds default contexts.
pub struct ContextBuilder {
    config: Arc<ServerConfig>,
    assets: Arc<AssetResolver>,
}

impl ContextBuilder {
    pub fn new(config: Arc<ServerConfig>, assets: Arc<AssetResolver>) -> Self {
        Self { config, assets }
    }

    /// Asset URLs for the current request.
    pub fn asset_urls(&self) -> StaticAssetMap {
        self.assets.resolve()
    }

    /// The context every request starts from.
    pub fn build(&self, request: &PageRequest) -> RequestContext {
        let development = self.config.is_development();
        let urls = self.asset_urls();
        let is_debug = development || request.has_query_key("debug");

        let app = AppContext {
            client_ip: request.client_ip().map(display_ip),
            is_debug,
            static_urls: EDITOR_STYLESHEETS
                .iter()
                .filter_map(|name| urls.get(name))
                .map(str::to_string)
                .collect(),
        };

        let mut context = RequestContext {
            compile_debug: development,
            urls,
            user: None,
            env: self.config.env.clone(),
            is_rtl: self.config.i18n.rtl,
            is_debug,
            lang: self.config.i18n.default_locale_slug.clone(),
            badge: None,
            favicon_url: DEFAULT_FAVICON.to_string(),
            feedback_url: None,
            dev_docs: false,
            is_fluid_width: self.config.is_enabled("fluid-width"),
            chunk: None,
            app,
            store: StateStore::default(),
        };
        apply_environment(&mut context);
        context
    }
}

/// Badges and links for non-production environments.
fn apply_environment(context: &mut RequestContext) {
    match context.env.as_str() {
        "development" => {
            context.badge = Some("dev".into());
            context.dev_docs = true;
            context.feedback_url = Some(FEEDBACK_URL.into());
            context.favicon_url = "/calypso/images/favicons/favicon-development.ico".into();
        }
        "wpcalypso" => {
            context.badge = Some("wpcalypso".into());
            context.dev_docs = true;
            context.feedback_url = Some(FEEDBACK_URL.into());
            context.favicon_url = "/calypso/images/favicons/favicon-wpcalypso.ico".into();
        }
        "horizon" => {
            context.badge = Some("feedback".into());
            context.feedback_url = Some("https://horizonfeedback.wordpress.com/".into());
            context.favicon_url = "/calypso/images/favicons/favicon-horizon.ico".into();
        }
        "stage" => {
            context.badge = Some("staging".into());
            context.feedback_url = Some(FEEDBACK_URL.into());
            context.favicon_url = "/calypso/images/favicons/favicon-staging.ico".into();
        }
        _ => {}
    }
}
