use crate::auth::{Authenticator, PasswordAuthenticator};
use crate::config::Settings;
use crate::http::{
    Request, Response, ReqwestTransport, Transport, TransportError, TransportRequest,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use crate::sobject::{Registry, ResourceKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Content type sent with every request unless the request overrides it.
const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Errors that can occur during client operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Failed to read credentials file from disk.
    #[error("Failed to read credentials file at {path}: {source}")]
    ReadCredentials {
        /// Path to the credentials file that failed to read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse credentials JSON.
    #[error("Failed to parse credentials JSON: {source}")]
    ParseCredentials {
        #[source]
        source: serde_json::Error,
    },
    /// Failed to read settings file from disk.
    #[error("Failed to read settings file at {path}: {source}")]
    ReadSettings {
        /// Path to the settings file that failed to read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse settings JSON.
    #[error("Failed to parse settings JSON: {source}")]
    ParseSettings {
        #[source]
        source: serde_json::Error,
    },
    /// Invalid URL format for the base URI or token endpoint.
    #[error("Invalid URL format: {source}")]
    ParseUrl {
        #[source]
        source: url::ParseError,
    },
    /// Required builder parameter was not provided.
    #[error("Missing required attribute: {}", _0)]
    MissingRequiredAttribute(String),
    /// An authenticated call was attempted on a client without credentials.
    #[error("Credential must be set")]
    MissingCredentials,
    /// The OAuth2 exchange did not yield a usable access token.
    #[error("Could not obtain access token: {0}")]
    TokenExchange(Box<dyn std::error::Error + Send + Sync>),
    /// No HTTP response was received.
    #[error("Transport error: {source}")]
    Transport {
        #[source]
        source: TransportError,
    },
    /// A header value (such as the bearer token) contains invalid characters.
    #[error("Invalid header value: {source}")]
    InvalidHeaderValue {
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    /// Failed to serialize a request body.
    #[error("Failed to encode request body: {source}")]
    EncodeBody {
        #[source]
        source: serde_json::Error,
    },
    /// A record operation expected a JSON body and got something else.
    #[error("Response body is not valid JSON (status {status})")]
    Decode {
        /// HTTP status of the response.
        status: u16,
    },
}

/// Salesforce OAuth2 credentials for the username-password flow.
///
/// Obtained from a Salesforce Connected App (Consumer Key and Consumer
/// Secret) plus the integration user's login.
///
/// # Examples
///
/// ```
/// use salesforce_rest::client::Credentials;
///
/// let creds = Credentials {
///     client_id: "your_client_id".to_string(),
///     client_secret: "your_client_secret".to_string(),
///     username: "user@example.com".to_string(),
///     password: "your_password".to_string(),
///     security_token: "your_security_token".to_string(),
///     auth_url: None,
/// };
/// assert_eq!(creds.token_url(), salesforce_rest::DEFAULT_AUTH_URL);
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Client ID from the Connected App (Consumer Key).
    pub client_id: String,
    /// Client Secret from the Connected App (Consumer Secret).
    pub client_secret: String,
    /// Username for authentication (email address).
    pub username: String,
    /// Password for authentication.
    pub password: String,
    /// Security token appended to the password.
    ///
    /// Leave empty when the org trusts the caller's IP range.
    #[serde(default)]
    pub security_token: String,
    /// Token endpoint override.
    ///
    /// For sandbox orgs, use `https://test.salesforce.com/services/oauth2/token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
}

impl Credentials {
    /// Returns the token endpoint: `auth_url` when set and non-empty, otherwise
    /// [`DEFAULT_AUTH_URL`](crate::DEFAULT_AUTH_URL).
    pub fn token_url(&self) -> &str {
        match self.auth_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => crate::DEFAULT_AUTH_URL,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("security_token", &"[redacted]")
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

/// Source for loading credentials.
#[derive(Debug, Clone)]
pub enum CredentialsFrom {
    /// Load credentials from a JSON file.
    Path(PathBuf),
    /// Use credentials provided directly.
    Value(Credentials),
}

impl CredentialsFrom {
    fn load(&self) -> Result<Credentials, Error> {
        match self {
            CredentialsFrom::Value(creds) => Ok(creds.clone()),
            CredentialsFrom::Path(path) => {
                let credentials_string =
                    fs::read_to_string(path).map_err(|e| Error::ReadCredentials {
                        path: path.clone(),
                        source: e,
                    })?;
                serde_json::from_str(&credentials_string)
                    .map_err(|e| Error::ParseCredentials { source: e })
            }
        }
    }
}

/// Source for loading settings.
#[derive(Debug, Clone)]
enum SettingsFrom {
    Path(PathBuf),
    Value(Settings),
}

/// Client for the Salesforce REST API.
///
/// Use [`Builder`] to construct a client instance. The client owns the
/// base URI (replaced by the instance URL after the first authentication),
/// the API version, credentials, a [`Transport`] and an [`Authenticator`].
///
/// Requests are dispatched with [`send_request`](Self::send_request)
/// (unauthenticated) or [`auth_and_send_request`](Self::auth_and_send_request).
/// Typed record operations live on the resources returned by
/// [`util`](Self::util), [`sobject`](Self::sobject) and friends.
///
/// # Examples
///
/// ```no_run
/// use salesforce_rest::client::{self, Credentials};
/// use salesforce_rest::http::Request;
/// use reqwest::Method;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = client::Builder::new()
///     .base_uri("https://login.salesforce.com")
///     .credentials_path("credentials.json".into())
///     .version("v58.0")
///     .build()?;
///
/// let mut request = Request::new(Method::GET, "/services/data/v58.0/limits");
/// let response = client.auth_and_send_request(&mut request).await?;
/// println!("{} {:?}", response.status(), response.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    base_uri: RwLock<String>,
    version: String,
    credentials_from: Option<CredentialsFrom>,
    settings: Settings,
    default_headers: HeaderMap,
    transport: Arc<dyn Transport>,
    authenticator: Arc<dyn Authenticator>,
    pub(crate) resources: Registry,
}

impl Client {
    /// Returns the current base URI.
    pub fn base_uri(&self) -> String {
        self.base_uri
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the base URI used for all subsequent requests.
    pub fn set_base_uri(&self, base_uri: impl Into<String>) {
        *self.base_uri.write().unwrap_or_else(PoisonError::into_inner) = base_uri.into();
    }

    /// Returns the API version (e.g. `v58.0`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the settings the client was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Headers sent with every request unless the request overrides them.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Returns the transport used for every HTTP call, including the token exchange.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Returns the authenticator that stamps authenticated requests.
    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Returns true if credentials were configured.
    pub fn has_credentials(&self) -> bool {
        self.credentials_from.is_some()
    }

    /// Loads the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No credentials were configured ([`Error::MissingCredentials`])
    /// - Credentials file cannot be read ([`Error::ReadCredentials`])
    /// - Credentials JSON is invalid ([`Error::ParseCredentials`])
    pub fn credentials(&self) -> Result<Credentials, Error> {
        self.credentials_from
            .as_ref()
            .ok_or(Error::MissingCredentials)?
            .load()
    }

    /// Builds the absolute URL for a request path.
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_uri(), path)
    }

    /// Sends a request without authenticating it.
    ///
    /// Default headers are merged under the request's own headers, so a
    /// request header wins over a default with the same name. The body is
    /// JSON-encoded for POST, PATCH, PUT and OPTIONS requests.
    ///
    /// Any HTTP status, including 4xx and 5xx, is returned as a [`Response`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The body cannot be serialized ([`Error::EncodeBody`])
    /// - No HTTP response was received ([`Error::Transport`])
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn send_request(&self, request: &Request) -> Result<Response, Error> {
        let url = self.build_url(request.uri());

        let mut headers = self.default_headers.clone();
        headers.extend(request.headers().clone());

        let body = match request.body() {
            Some(body) if request.carries_body() => {
                Some(serde_json::to_vec(body).map_err(|source| Error::EncodeBody { source })?)
            }
            _ => None,
        };

        debug!(method = %request.method(), %url, "sending request");
        let raw = self
            .transport
            .execute(TransportRequest {
                method: request.method().clone(),
                url,
                headers,
                body,
                sensitive: false,
            })
            .await
            .map_err(|source| Error::Transport { source })?;

        let response = Response::from_raw(&raw);
        debug!(status = response.status(), "received response");
        Ok(response)
    }

    /// Authenticates a request with the client's [`Authenticator`] and sends it.
    ///
    /// The request's `Authorization` header is set (or replaced) before
    /// dispatch. A token rejected by the server is not retried; the
    /// response (typically 401) is returned as is.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client has no credentials ([`Error::MissingCredentials`])
    /// - No access token could be obtained ([`Error::TokenExchange`])
    /// - Any error from [`send_request`](Self::send_request)
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn auth_and_send_request(&self, request: &mut Request) -> Result<Response, Error> {
        self.authenticator.authenticate(self, request).await?;
        self.send_request(request).await
    }
}

/// Builder for constructing a [`Client`].
///
/// # Examples
///
/// ## Credentials as a value
///
/// ```no_run
/// use salesforce_rest::client::{self, Credentials};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = client::Builder::new()
///     .base_uri("https://login.salesforce.com")
///     .credentials(Credentials {
///         client_id: "your_client_id".to_string(),
///         client_secret: "your_client_secret".to_string(),
///         username: "user@example.com".to_string(),
///         password: "your_password".to_string(),
///         security_token: "your_security_token".to_string(),
///         auth_url: None,
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// ## Loading from files
///
/// ```no_run
/// use salesforce_rest::client;
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = client::Builder::new()
///     .base_uri("https://login.salesforce.com")
///     .credentials_path(PathBuf::from("credentials.json"))
///     .settings_path(PathBuf::from("settings.json"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Builder {
    base_uri: Option<String>,
    credentials_from: Option<CredentialsFrom>,
    version: Option<String>,
    settings_from: Option<SettingsFrom>,
    default_headers: HeaderMap,
    transport: Option<Arc<dyn Transport>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    resources: Vec<(String, ResourceKind)>,
}

impl Builder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URI (e.g. `https://login.salesforce.com`).
    ///
    /// After the first authentication the client switches to the instance
    /// URL returned by Salesforce.
    pub fn base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Sets credentials to load from a JSON file.
    ///
    /// The file is read when a token is needed. It should contain:
    ///
    /// ```json
    /// {
    ///   "client_id": "your_client_id",
    ///   "client_secret": "your_client_secret",
    ///   "username": "user@example.com",
    ///   "password": "your_password",
    ///   "security_token": "your_security_token"
    /// }
    /// ```
    pub fn credentials_path(mut self, path: PathBuf) -> Self {
        self.credentials_from = Some(CredentialsFrom::Path(path));
        self
    }

    /// Sets credentials directly.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials_from = Some(CredentialsFrom::Value(credentials));
        self
    }

    /// Sets the API version (e.g. `v58.0`).
    ///
    /// An empty version falls back to [`Settings::default_version`].
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the client settings.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings_from = Some(SettingsFrom::Value(settings));
        self
    }

    /// Sets settings to load from a JSON file when the client is built.
    pub fn settings_path(mut self, path: PathBuf) -> Self {
        self.settings_from = Some(SettingsFrom::Path(path));
        self
    }

    /// Adds a header sent with every request.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Sets the transport. Defaults to a [`ReqwestTransport`] built from the settings.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the authenticator. Defaults to [`PasswordAuthenticator`].
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Registers a named resource resolvable with [`Client::resource`].
    ///
    /// Registering an existing name replaces it.
    pub fn resource(mut self, name: impl Into<String>, kind: ResourceKind) -> Self {
        self.resources.push((name.into(), kind));
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No base URI was provided ([`Error::MissingRequiredAttribute`])
    /// - The base URI is malformed ([`Error::ParseUrl`])
    /// - The settings file cannot be loaded ([`Error::ReadSettings`], [`Error::ParseSettings`])
    /// - The default transport cannot be created ([`Error::Transport`])
    pub fn build(self) -> Result<Client, Error> {
        let base_uri = self
            .base_uri
            .ok_or_else(|| Error::MissingRequiredAttribute("base_uri".to_string()))?;
        url::Url::parse(&base_uri).map_err(|source| Error::ParseUrl { source })?;

        let settings = match self.settings_from {
            Some(SettingsFrom::Value(settings)) => settings,
            Some(SettingsFrom::Path(path)) => Settings::from_path(path)?,
            None => Settings::default(),
        };

        let version = self
            .version
            .filter(|version| !version.is_empty())
            .unwrap_or_else(|| settings.default_version.clone());

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(&settings).map_err(|source| Error::Transport { source })?,
            ),
        };

        let authenticator = self
            .authenticator
            .unwrap_or_else(|| Arc::new(PasswordAuthenticator::new()));

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        default_headers.extend(self.default_headers);

        let mut resources = Registry::default();
        for (name, kind) in self.resources {
            resources.register(name, kind);
        }

        Ok(Client {
            base_uri: RwLock::new(base_uri),
            version,
            credentials_from: self.credentials_from,
            settings,
            default_headers,
            transport,
            authenticator,
            resources,
        })
    }
}
