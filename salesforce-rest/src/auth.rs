//! Access tokens and request authentication.
//!
//! An [`Authenticator`] stamps outgoing requests with credentials before the
//! client dispatches them. The default, [`PasswordAuthenticator`], runs the
//! OAuth2 username-password flow, caches the resulting [`AccessToken`] and
//! re-authenticates once it expires. [`StaticTokenAuthenticator`] injects a
//! token obtained elsewhere.
//!
//! # Example
//!
//! ```no_run
//! use salesforce_rest::auth::StaticTokenAuthenticator;
//! use salesforce_rest::client;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = client::Builder::new()
//!     .base_uri("https://mydomain.my.salesforce.com")
//!     .authenticator(Arc::new(StaticTokenAuthenticator::new("00Dxx!token")))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod password;
mod token;

pub use password::PasswordAuthenticator;
pub use token::AccessToken;

use crate::client::{Client, Error};
use crate::http::Request;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};

/// Authenticates requests on behalf of a [`Client`].
///
/// Implementations receive the client at call time, which gives them the
/// credentials, settings and transport and lets them update the base URI.
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    /// Adds credentials to `request`, acquiring them first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable credentials could be obtained. The
    /// request must not be dispatched in that case.
    async fn authenticate(&self, client: &Client, request: &mut Request) -> Result<(), Error>;
}

/// Sets `Authorization: Bearer <token>`, replacing any existing value.
///
/// # Errors
///
/// Returns [`Error::InvalidHeaderValue`] if the token is not a valid header value.
pub(crate) fn set_bearer(request: &mut Request, token: &str) -> Result<(), Error> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|source| Error::InvalidHeaderValue { source })?;
    value.set_sensitive(true);
    request.set_header(AUTHORIZATION, value);
    Ok(())
}

/// Authenticator that always uses the same bearer token.
#[derive(Debug, Clone)]
pub struct StaticTokenAuthenticator {
    token: oauth2::AccessToken,
}

impl StaticTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: oauth2::AccessToken::new(token.into()),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, _client: &Client, request: &mut Request) -> Result<(), Error> {
        set_bearer(request, self.token.secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Builder;
    use reqwest::Method;

    #[tokio::test]
    async fn test_static_token_sets_header() {
        let client = Builder::new()
            .base_uri("https://x.my.salesforce.com")
            .build()
            .unwrap();
        let authenticator = StaticTokenAuthenticator::new("fixed");
        let mut request = Request::new(Method::GET, "/services/data");

        authenticator
            .authenticate(&client, &mut request)
            .await
            .unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer fixed");
    }

    #[test]
    fn test_set_bearer_overwrites() {
        let mut request = Request::new(Method::GET, "/")
            .with_header("authorization", HeaderValue::from_static("Basic abc"));
        set_bearer(&mut request, "tok").unwrap();
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers()["Authorization"], "Bearer tok");
        assert!(request.headers()[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_set_bearer_rejects_invalid_token() {
        let mut request = Request::new(Method::GET, "/");
        let result = set_bearer(&mut request, "bad\ntoken");
        assert!(matches!(result, Err(Error::InvalidHeaderValue { .. })));
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_static_token_debug_redacts() {
        let debug_str = format!("{:?}", StaticTokenAuthenticator::new("hidden-token"));
        assert!(!debug_str.contains("hidden-token"));
    }
}
