//! Pluggable HTTP transport.
//!
//! The client never talks to the network directly; it hands a
//! [`TransportRequest`] to a [`Transport`] and gets back a [`RawResponse`]
//! (header block and body in one buffer plus the header length). The default
//! implementation, [`ReqwestTransport`], is backed by `reqwest`.

use crate::config::Settings;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::Method;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Maximum number of redirects followed by [`ReqwestTransport`].
const MAX_REDIRECTS: usize = 10;

/// Errors raised below the HTTP layer (DNS, connect, TLS, I/O).
///
/// A response with an error status is not a transport error.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// Error from the underlying `reqwest` client.
    #[error("HTTP client error: {source}")]
    Reqwest {
        #[source]
        source: reqwest::Error,
    },
    /// Error reported by a custom [`Transport`] implementation.
    #[error("Transport error: {0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

/// A fully resolved outgoing HTTP call.
#[derive(Debug, Clone, Default)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    pub headers: HeaderMap,
    /// Encoded body, if any.
    pub body: Option<Vec<u8>>,
    /// The body or the response carries credentials (the token exchange).
    ///
    /// Such exchanges are never written to the verbose trace.
    pub sensitive: bool,
}

/// The raw outcome of an HTTP call.
///
/// `data` holds the header block immediately followed by the body;
/// `header_len` is the byte length of the header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub header_len: usize,
    pub data: Vec<u8>,
}

impl RawResponse {
    /// Builds a raw response from decoded parts.
    ///
    /// Useful for custom transports and test doubles.
    pub fn from_parts(status: u16, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut head = render_headers(headers);
        head.push_str("\r\n");

        let header_len = head.len();
        let mut data = head.into_bytes();
        data.extend_from_slice(body);
        Self {
            status,
            header_len,
            data,
        }
    }

    /// Returns the body bytes.
    pub fn body(&self) -> &[u8] {
        &self.data[self.header_len.min(self.data.len())..]
    }
}

/// Renders `Name: Value\r\n` lines.
fn render_headers(headers: &HeaderMap) -> String {
    let mut head = String::new();
    for (name, value) in headers {
        let _ = write!(
            head,
            "{}: {}\r\n",
            name.as_str(),
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    head
}

/// Executes HTTP calls on behalf of the client.
///
/// Implement this to route traffic through a custom stack or to script
/// responses in tests.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Performs the call and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no HTTP response was received.
    async fn execute(&self, request: TransportRequest) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client.
///
/// Follows redirects and verifies TLS certificates unless
/// [`Settings::accept_invalid_certs`] is set. When
/// [`Settings::http_verbose_log_file`] is set, each exchange is traced to
/// that file, except exchanges marked [`TransportRequest::sensitive`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    verbose_log_file: Option<PathBuf>,
}

impl ReqwestTransport {
    /// Creates a transport configured from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(settings: &Settings) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout());

        if settings.accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|source| TransportError::Reqwest { source })?;

        Ok(Self {
            client,
            verbose_log_file: settings.http_verbose_log_file.clone(),
        })
    }

    /// Wraps an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            verbose_log_file: None,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    async fn execute(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| TransportError::Reqwest { source })?;

        let status = response.status();
        let mut head = format!("{:?} {}\r\n", response.version(), status);
        head.push_str(&render_headers(response.headers()));
        head.push_str("\r\n");

        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Reqwest { source })?;

        debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            "received HTTP response"
        );

        match &self.verbose_log_file {
            Some(path) if !request.sensitive => {
                if let Err(error) = write_trace(path, &request, &head, &body).await {
                    warn!(path = %path.display(), %error, "failed to write verbose HTTP log");
                }
            }
            _ => {}
        }

        let header_len = head.len();
        let mut data = head.into_bytes();
        data.extend_from_slice(&body);
        Ok(RawResponse {
            status: status.as_u16(),
            header_len,
            data,
        })
    }
}

/// Writes a request/response trace, replacing the previous file contents.
async fn write_trace(
    path: &Path,
    request: &TransportRequest,
    head: &str,
    body: &[u8],
) -> std::io::Result<()> {
    let mut trace = format!("> {} {}\n", request.method, request.url);
    for (name, value) in &request.headers {
        if *name == AUTHORIZATION {
            let _ = writeln!(trace, "> {name}: [redacted]");
        } else {
            let _ = writeln!(trace, "> {name}: {}", String::from_utf8_lossy(value.as_bytes()));
        }
    }
    if let Some(body) = &request.body {
        let _ = writeln!(trace, ">\n{}", String::from_utf8_lossy(body));
    }
    for line in head.lines().filter(|line| !line.is_empty()) {
        let _ = writeln!(trace, "< {line}");
    }
    let _ = writeln!(trace, "<\n{}", String::from_utf8_lossy(body));
    tokio::fs::write(path, trace).await
}
