//! Unofficial Rust SDK for the Salesforce REST API.
//!
//! This crate provides OAuth2 username-password authentication with lazy
//! token refresh, a pluggable HTTP transport, and typed sObject operations
//! (create, read, update, delete, describe and SOQL queries).
//!
//! # Examples
//!
//! ```no_run
//! use salesforce_rest::client::{self, Credentials};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = client::Builder::new()
//!     .base_uri("https://login.salesforce.com")
//!     .credentials(Credentials {
//!         client_id: "...".to_string(),
//!         client_secret: "...".to_string(),
//!         username: "user@example.com".to_string(),
//!         password: "...".to_string(),
//!         security_token: "...".to_string(),
//!         auth_url: None,
//!     })
//!     .version("v58.0")
//!     .build()?;
//!
//! let account = client.account().get("001xx000003DGb2AAG").await?;
//! println!("{account}");
//! # Ok(())
//! # }
//! ```

/// Default Salesforce API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v20.0";

/// Default access token lifetime (90 minutes).
///
/// The password grant does not report an expiry, so tokens are considered
/// expired once they are older than this.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 5400;

/// Default OAuth2 token endpoint for the username-password flow.
pub const DEFAULT_AUTH_URL: &str = "https://login.salesforce.com/services/oauth2/token";

/// Default connection timeout for HTTP requests (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default request timeout for HTTP requests (120 seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Client configuration, credentials and request dispatch.
pub mod client;

/// Settings injected into a [`client::Client`].
pub mod config;

/// Access tokens and pluggable request authentication.
pub mod auth;

/// Transport-level request and response types.
pub mod http;

/// Typed sObject resources built on top of the client.
pub mod sobject;
