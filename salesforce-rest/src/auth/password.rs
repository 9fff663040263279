use super::{set_bearer, AccessToken, Authenticator};
use crate::client::{Client, Credentials, Error};
use crate::http::{normalize, Request, Transport, TransportError, TransportRequest};
use async_trait::async_trait;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthType, ClientId, ClientSecret, ExtraTokenFields, HttpRequest, HttpResponse,
    RequestTokenError, ResourceOwnerPassword, ResourceOwnerUsername, StandardRevocableToken,
    StandardTokenResponse, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Extra fields Salesforce returns alongside the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct InstanceFields {
    /// Tenant-specific base URL for all subsequent API calls.
    instance_url: String,
}

impl ExtraTokenFields for InstanceFields {}

type SalesforceTokenResponse = StandardTokenResponse<InstanceFields, BasicTokenType>;

type SalesforceOAuthClient = oauth2::Client<
    BasicErrorResponse,
    SalesforceTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

/// OAuth2 username-password authenticator.
///
/// Holds at most one current [`AccessToken`]. Each authenticated request
/// reuses it while it is valid; when it is missing or expired the full
/// password exchange runs again (Salesforce issues no refresh token for this
/// flow). A successful exchange also points the client at the returned
/// instance URL.
///
/// Token acquisition is serialized: concurrent requests that find the token
/// missing or expired wait for a single exchange and share its result.
#[derive(Debug, Default)]
pub struct PasswordAuthenticator {
    current: Mutex<Option<AccessToken>>,
}

impl PasswordAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token without validating or refreshing it.
    pub async fn current_token(&self) -> Option<AccessToken> {
        self.current.lock().await.clone()
    }

    /// Drops the cached token so the next request re-authenticates.
    ///
    /// Use this after Salesforce rejects a token with `INVALID_SESSION_ID`;
    /// requests are not retried automatically.
    pub async fn invalidate(&self) {
        self.current.lock().await.take();
    }

    /// Returns a valid token, authenticating when none is cached or the cached one expired.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client has no credentials ([`Error::MissingCredentials`])
    /// - The token endpoint is malformed ([`Error::ParseUrl`])
    /// - The exchange produced no usable token ([`Error::TokenExchange`])
    /// - The token endpoint could not be reached ([`Error::Transport`])
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn valid_token(&self, client: &Client) -> Result<AccessToken, Error> {
        let mut current = self.current.lock().await;

        let token = match current.take() {
            Some(token) if !token.is_expired() => {
                debug!("reusing cached access token");
                token
            }
            Some(expired) => {
                debug!("access token expired, re-authenticating");
                self.refresh_token(client, &expired).await?
            }
            None => {
                debug!("no access token, authenticating");
                self.create_token(client).await?
            }
        };

        *current = Some(token.clone());
        Ok(token)
    }

    /// Refreshing repeats the password exchange.
    async fn refresh_token(
        &self,
        client: &Client,
        _expired: &AccessToken,
    ) -> Result<AccessToken, Error> {
        self.create_token(client).await
    }

    async fn create_token(&self, client: &Client) -> Result<AccessToken, Error> {
        let credentials = client.credentials()?;
        let token_response = exchange_password(&credentials, client.transport()).await?;

        client.set_base_uri(token_response.extra_fields().instance_url.clone());
        debug!(instance_url = %token_response.extra_fields().instance_url, "obtained access token");

        Ok(AccessToken::new(
            token_response.access_token().secret().clone(),
            client.settings().token_lifetime(),
        ))
    }

    #[cfg(test)]
    pub(crate) async fn set_current_token(&self, token: AccessToken) {
        *self.current.lock().await = Some(token);
    }
}

#[async_trait]
impl Authenticator for PasswordAuthenticator {
    async fn authenticate(&self, client: &Client, request: &mut Request) -> Result<(), Error> {
        let token = self.valid_token(client).await?;
        set_bearer(request, token.secret())
    }
}

/// Performs the OAuth2 Resource Owner Password Credentials flow.
///
/// Client id and secret travel in the form body; the password sent is the
/// user's password followed by their security token.
async fn exchange_password(
    credentials: &Credentials,
    transport: &Arc<dyn Transport>,
) -> Result<SalesforceTokenResponse, Error> {
    let oauth2_client = SalesforceOAuthClient::new(ClientId::new(credentials.client_id.clone()))
        .set_client_secret(ClientSecret::new(credentials.client_secret.clone()))
        .set_auth_type(AuthType::RequestBody)
        .set_token_uri(
            TokenUrl::new(credentials.token_url().to_string())
                .map_err(|source| Error::ParseUrl { source })?,
        );

    let username = ResourceOwnerUsername::new(credentials.username.clone());
    let password = ResourceOwnerPassword::new(format!(
        "{}{}",
        credentials.password, credentials.security_token
    ));

    let transport = Arc::clone(transport);
    let http_client = move |request: HttpRequest| forward(Arc::clone(&transport), request);

    oauth2_client
        .exchange_password(&username, &password)
        .request_async(&http_client)
        .await
        .map_err(|error| match error {
            RequestTokenError::Request(source) => Error::Transport { source },
            other => Error::TokenExchange(Box::new(other)),
        })
}

/// Sends an `oauth2` HTTP request through the client's transport.
///
/// The exchange carries the password and client secret, so it is marked
/// sensitive and kept out of the verbose trace.
async fn forward(
    transport: Arc<dyn Transport>,
    request: HttpRequest,
) -> Result<HttpResponse, TransportError> {
    let (parts, body) = request.into_parts();

    let raw = transport
        .execute(TransportRequest {
            method: parts.method,
            url: parts.uri.to_string(),
            headers: parts.headers,
            body: Some(body),
            sensitive: true,
        })
        .await?;

    let head = &raw.data[..raw.header_len.min(raw.data.len())];
    let mut response = oauth2::http::Response::builder()
        .status(raw.status)
        .body(raw.body().to_vec())
        .map_err(|error| TransportError::Custom(Box::new(error)))?;
    *response.headers_mut() = normalize::parse_headers(&String::from_utf8_lossy(head));
    Ok(response)
}
