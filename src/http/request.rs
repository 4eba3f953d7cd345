//! Request inspection.
//!
//! # Responsibilities
//! - Capture the parts of an incoming request the pipeline reads
//! - Parse query strings and the Cookie header
//! - Resolve the client address and forwarded protocol
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing (tower-http layer)
//! - Empty cookie values count as absent
//! - Multiple Cookie headers are treated as one list

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request, Uri};
use std::net::{IpAddr, SocketAddr};

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The parts of a request the page pipeline needs.
#[derive(Debug, Clone)]
pub struct PageRequest {
    uri: Uri,
    headers: HeaderMap,
    client_ip: Option<IpAddr>,
}

impl PageRequest {
    pub fn new(uri: Uri, headers: HeaderMap, client_ip: Option<IpAddr>) -> Self {
        Self { uri, headers, client_ip }
    }

    /// Capture a request, taking the peer address from axum's connect info.
    pub fn from_request(request: &Request<Body>) -> Self {
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Self::new(request.uri().clone(), request.headers().clone(), client_ip)
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Path and query as received.
    pub fn original_url(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| self.uri.path())
    }

    /// Decoded query pairs in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First value for a query key.
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// True if the key appears in the query, with or without a value.
    pub fn has_query_key(&self, key: &str) -> bool {
        self.query_pairs().iter().any(|(k, _)| k == key)
    }

    /// Value of a named cookie.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookie(name).is_some()
    }

    /// The raw Cookie header, joining repeated headers.
    pub fn cookie_header(&self) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join("; "))
        }
    }

    /// `https` only when a proxy says so.
    pub fn forwarded_proto(&self) -> &'static str {
        match self.headers.get("x-forwarded-proto").and_then(|v| v.to_str().ok()) {
            Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
            _ => "http",
        }
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client_ip
    }

    /// Request id assigned by the request-id layer.
    pub fn request_id(&self) -> &str {
        self.headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}
