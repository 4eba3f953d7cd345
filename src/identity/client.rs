//! HTTP identity service client.
//!
//! # Responsibilities
//! - Forward the visitor's raw Cookie header to the identity service
//! - Decode the user or the structured error
//! - Bound the lookup with a deadline

use futures_util::future::BoxFuture;
use reqwest::header::COOKIE;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::schema::IdentityConfig;
use crate::identity::types::{IdentityError, User};

/// Looks up the user behind a session.
pub trait IdentityService: Send + Sync {
    /// Resolve the user for a raw `Cookie` header. Called at most once per request.
    fn fetch_user<'a>(&'a self, cookie_header: &'a str) -> BoxFuture<'a, Result<User, IdentityError>>;
}

/// Identity service reached over HTTP.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: reqwest::Client,
    url: String,
    timeout_duration: Duration,
}

impl HttpIdentityClient {
    pub fn new(config: &IdentityConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            timeout_duration: Duration::from_secs(config.timeout_secs),
        })
    }

    async fn lookup(&self, cookie_header: &str) -> Result<User, IdentityError> {
        let response = self
            .client
            .get(&self.url)
            .header(COOKIE, cookie_header)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<User>().await?);
        }

        let body = response.bytes().await?;
        Err(IdentityError::from_response(status.as_u16(), &body))
    }
}

impl IdentityService for HttpIdentityClient {
    fn fetch_user<'a>(&'a self, cookie_header: &'a str) -> BoxFuture<'a, Result<User, IdentityError>> {
        Box::pin(async move {
            match timeout(self.timeout_duration, self.lookup(cookie_header)).await {
                Ok(result) => result,
                Err(_) => Err(IdentityError::Timeout(self.timeout_duration)),
            }
        })
    }
}
