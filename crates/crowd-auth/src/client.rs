//! Crowd directory client: user profile lookup and password authentication.

use crate::models::{PasswordCredential, RemoteErrorInfo, UserProfile};
use crate::transport::{
    BasicCredentials, HttpTransport, ReqwestTransport, TransportRequest, TransportResponse,
};
use crate::Result;
use crowd_core::client::HttpConfig;
use crowd_core::ClientConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const USER_RESOURCE: &str = "user";
const AUTHENTICATION_RESOURCE: &str = "authentication";
const JSON: &str = "application/json";

/// Builder for [`DirectoryClient`].
pub struct DirectoryClientBuilder {
    config: ClientConfig,
    http_config: HttpConfig,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl DirectoryClientBuilder {
    /// Create a new builder from a [`ClientConfig`].
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http_config: HttpConfig::new(),
            transport: None,
        }
    }

    /// Override the HTTP client configuration used by the default transport.
    ///
    /// The request timeout always comes from [`ClientConfig::timeout`].
    #[must_use]
    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Use `transport` instead of building a [`ReqwestTransport`].
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Finalise the builder and create the [`DirectoryClient`].
    ///
    /// No request is made here.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn build(self) -> Result<DirectoryClient> {
        self.config.ensure_valid()?;
        let base_url = self.config.base_url()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                Arc::new(ReqwestTransport::new(&self.config, self.http_config)?)
            }
        };

        debug!(base_url = %base_url, "Crowd client configured");

        Ok(DirectoryClient {
            config: Arc::new(self.config),
            base_url,
            transport,
        })
    }
}

/// Client for the Crowd user management REST API.
///
/// Each call is one independent request; clones share configuration and the
/// underlying connection pool.
#[derive(Clone)]
pub struct DirectoryClient {
    config: Arc<ClientConfig>,
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
}

impl DirectoryClient {
    /// Construct a client that talks to the directory over `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        DirectoryClientBuilder::new(config).build()
    }

    /// Construct a client that sends its requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        DirectoryClientBuilder::new(config)
            .with_transport(transport)
            .build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: ClientConfig) -> DirectoryClientBuilder {
        DirectoryClientBuilder::new(config)
    }

    /// Base URL of the user management API.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Configuration the client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches the basic profile of `username`.
    ///
    /// # Errors
    ///
    /// Returns [`Transport`](crowd_core::Error::Transport) for any non-2xx
    /// status, unreadable body, or connection failure.
    pub async fn fetch_user_profile(&self, username: &str) -> Result<UserProfile> {
        let url = self.resource_url(USER_RESOURCE, username)?;
        debug!(username = %username, "Fetching Crowd user profile");

        let response = self
            .transport
            .execute(self.request(Method::GET, url, None))
            .await?;

        if !response.status.is_success() {
            warn!(status = %response.status, "Crowd user lookup failed");
            return Err(response.into_transport_error());
        }

        parse_profile(response)
    }

    /// Verifies `password` for `username` and returns the user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationFailed`](crowd_core::Error::AuthenticationFailed)
    /// when the directory rejects the credentials (HTTP 400 with a reason) and
    /// [`Transport`](crowd_core::Error::Transport) for every other failure.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserProfile> {
        let url = self.resource_url(AUTHENTICATION_RESOURCE, username)?;
        let body = serde_json::to_string(&PasswordCredential::new(password))?;
        debug!(username = %username, "Authenticating user against Crowd");

        let response = self
            .transport
            .execute(self.request(Method::POST, url, Some(body)))
            .await
            .map_err(|err| {
                warn!(error = %err, "Crowd authentication request failed");
                err
            })?;

        let status = response.status;
        if status.is_success() {
            return parse_profile(response);
        }

        if status == StatusCode::BAD_REQUEST {
            if let Some(info) = RemoteErrorInfo::parse(status, &response.body) {
                info!(
                    username = %username,
                    reason = %info.reason,
                    "Crowd rejected user credentials"
                );
                return Err(info.into());
            }
            warn!("Crowd returned 400 without a reason");
        } else {
            warn!(status = %status, "Crowd authentication returned an error status");
        }

        Err(response.into_transport_error())
    }

    fn resource_url(&self, resource: &str, username: &str) -> Result<Url> {
        let mut url = self.base_url.join(resource)?;
        url.query_pairs_mut().append_pair("username", username);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, body: Option<String>) -> TransportRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));

        debug!(%method, url = %url, "Sending Crowd request");

        TransportRequest {
            method,
            url,
            headers,
            body,
            credentials: BasicCredentials::new(
                self.config.application_username.as_str(),
                self.config.application_password.expose_secret(),
            ),
        }
    }
}

fn parse_profile(response: TransportResponse) -> Result<UserProfile> {
    UserProfile::from_slice(&response.body).map_err(|err| {
        warn!(error = %err, "Failed to parse Crowd user payload");
        response.into_transport_error()
    })
}
