//! Identity service payloads and errors.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error code the identity service returns for missing or expired sessions.
pub const AUTHORIZATION_REQUIRED: &str = "authorization_required";

/// The bootstrapped user.
///
/// Only the locale and text direction are interpreted here; every other
/// attribute is passed through to the client application untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "localeSlug", default, skip_serializing_if = "Option::is_none")]
    pub locale_slug: Option<String>,

    #[serde(rename = "isRTL", default, skip_serializing_if = "Option::is_none")]
    pub is_rtl: Option<bool>,

    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// Locale preference, ignoring empty slugs.
    pub fn locale(&self) -> Option<&str> {
        self.locale_slug.as_deref().filter(|slug| !slug.is_empty())
    }

    pub fn is_rtl(&self) -> bool {
        self.is_rtl.unwrap_or(false)
    }
}

/// Error body returned by the identity service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(rename = "error", default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiError {
    /// `code message` when both are present, otherwise whichever exists.
    pub fn log_message(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{} {}", code, message),
            (Some(code), None) => code.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => "unknown identity service error".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("authorization required")]
    AuthorizationRequired,

    #[error("API Error: {}", .0.log_message())]
    Api(ApiError),

    #[error("identity lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("identity transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl IdentityError {
    /// Classify a non-success response body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let mut api: ApiError = serde_json::from_slice(body).unwrap_or_default();
        if api.code.as_deref() == Some(AUTHORIZATION_REQUIRED) {
            return IdentityError::AuthorizationRequired;
        }
        if api.code.is_none() && api.message.is_none() {
            api.message = Some(format!("identity service returned status {}", status));
        }
        IdentityError::Api(api)
    }

    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            IdentityError::AuthorizationRequired => "authorization_required",
            IdentityError::Api(_) => "api_error",
            IdentityError::Timeout(_) => "timeout",
            IdentityError::Transport(_) => "transport_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_keeps_unknown_attributes() {
        let user: User = serde_json::from_str(
            r#"{"ID": 7, "username": "ada", "localeSlug": "fr", "isRTL": true}"#,
        )
        .unwrap();
        assert_eq!(user.locale(), Some("fr"));
        assert!(user.is_rtl());
        assert_eq!(user.attributes["username"], "ada");

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["ID"], 7);
        assert_eq!(value["localeSlug"], "fr");
    }

    #[test]
    fn test_empty_locale_is_ignored() {
        let user: User = serde_json::from_str(r#"{"localeSlug": ""}"#).unwrap();
        assert_eq!(user.locale(), None);
        assert!(!user.is_rtl());
    }

    #[test]
    fn test_error_classification() {
        let err = IdentityError::from_response(
            403,
            br#"{"error":"authorization_required","message":"An active access token must be used"}"#,
        );
        assert!(matches!(err, IdentityError::AuthorizationRequired));

        let err = IdentityError::from_response(500, br#"{"error":"unknown","message":"boom"}"#);
        assert_eq!(err.to_string(), "API Error: unknown boom");

        let err = IdentityError::from_response(502, b"<html>bad gateway</html>");
        assert_eq!(err.to_string(), "API Error: identity service returned status 502");
    }

    #[test]
    fn test_log_message_without_code() {
        let api = ApiError { code: None, message: Some("down".into()) };
        assert_eq!(api.log_message(), "down");
    }
}
