//! Client settings.
//!
//! [`Settings`] carries every tunable the client reads at runtime. It is
//! passed to [`Builder::settings`](crate::client::Builder::settings) or loaded
//! from a JSON file with [`Settings::from_path`]; fields missing from the file
//! fall back to their defaults.

use crate::client::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings for a [`Client`](crate::client::Client).
///
/// # Examples
///
/// ```
/// use salesforce_rest::config::Settings;
///
/// let settings: Settings = serde_json::from_str(r#"{"token_lifetime_secs": 3600}"#).unwrap();
/// assert_eq!(settings.token_lifetime_secs, 3600);
/// assert_eq!(settings.default_version, salesforce_rest::DEFAULT_API_VERSION);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Age in seconds after which an access token is treated as expired.
    pub token_lifetime_secs: u64,
    /// API version used when the client is built without one.
    pub default_version: String,
    /// File that receives a verbose trace of every HTTP exchange.
    ///
    /// The file is truncated on each request, so it holds the most recent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_verbose_log_file: Option<PathBuf>,
    /// Disables TLS certificate verification.
    ///
    /// **Warning:** only enable this against trusted test endpoints.
    pub accept_invalid_certs: bool,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_lifetime_secs: crate::DEFAULT_TOKEN_LIFETIME_SECS,
            default_version: crate::DEFAULT_API_VERSION.to_string(),
            http_verbose_log_file: None,
            accept_invalid_certs: false,
            connect_timeout_secs: crate::DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: crate::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read ([`Error::ReadSettings`])
    /// - The JSON is invalid ([`Error::ParseSettings`])
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::ReadSettings {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ParseSettings { source })
    }

    /// Token lifetime as a [`Duration`].
    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }

    /// Connection timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
