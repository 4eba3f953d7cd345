//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (isomorphic sections name a known sub-router)
//! - Validate value ranges (timeouts > 0, URLs parse)
//! - Detect duplicate sections and malformed path patterns
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::pattern::PathPattern;
use crate::sections::isomorphic::resolve_module;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("{field} '{value}' is not a valid URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("auth.session_cookie must not be empty")]
    EmptySessionCookie,

    #[error("static asset '{0}' must be relative to assets.public_dir")]
    AbsoluteAsset(String),

    #[error("section '{0}' declares no paths")]
    SectionWithoutPaths(String),

    #[error("section '{0}' is declared more than once")]
    DuplicateSection(String),

    #[error("section '{section}' has invalid path '{path}'")]
    InvalidPath { section: String, path: String },

    #[error("isomorphic section '{section}' references unknown module '{module}'")]
    UnknownModule { section: String, module: String },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let urls = [
        ("auth.login_url", &config.auth.login_url),
        ("identity.url", &config.identity.url),
        ("redirects.discover_logged_out_url", &config.redirects.discover_logged_out_url),
        ("redirects.verify_email_url", &config.redirects.verify_email_url),
        ("redirects.accept_invite_url", &config.redirects.accept_invite_url),
        ("redirects.plans_logged_out_url", &config.redirects.plans_logged_out_url),
        ("redirects.plans_jetpack_url", &config.redirects.plans_jetpack_url),
    ];
    for (field, value) in urls {
        if url::Url::parse(value).is_err() {
            errors.push(ValidationError::InvalidUrl { field, value: value.clone() });
        }
    }

    if config.identity.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("identity.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if config.auth.session_cookie.is_empty() {
        errors.push(ValidationError::EmptySessionCookie);
    }

    for file in &config.assets.static_files {
        if file.starts_with('/') {
            errors.push(ValidationError::AbsoluteAsset(file.clone()));
        }
    }

    let mut seen = HashSet::new();
    for section in &config.sections {
        if !seen.insert(section.name.as_str()) {
            errors.push(ValidationError::DuplicateSection(section.name.clone()));
        }
        if section.paths.is_empty() && !section.isomorphic {
            errors.push(ValidationError::SectionWithoutPaths(section.name.clone()));
        }
        for path in &section.paths {
            if PathPattern::section(path).is_err() {
                errors.push(ValidationError::InvalidPath {
                    section: section.name.clone(),
                    path: path.clone(),
                });
            }
        }
        if section.isomorphic && resolve_module(&section.module).is_none() {
            errors.push(ValidationError::UnknownModule {
                section: section.name.clone(),
                module: section.module.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
