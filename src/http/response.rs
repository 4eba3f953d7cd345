//! Response construction.
//!
//! # Responsibilities
//! - Build redirects with a `302 Found` status
//! - Wrap rendered views in HTML responses
//! - Map render failures to a plain 500

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::render::RenderError;

/// `302 Found` redirect.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(location = %location, "Refusing redirect to invalid location");
            (StatusCode::BAD_REQUEST, "Invalid redirect target").into_response()
        }
    }
}

/// HTML response for a rendered view.
pub fn html(status: StatusCode, rendered: Result<String, RenderError>) -> Response {
    match rendered {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "View rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
