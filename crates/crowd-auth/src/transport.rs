//! HTTP transport used by the directory client.
//!
//! [`HttpTransport`] is the only seam between the client and the network. The
//! production implementation is [`ReqwestTransport`]; tests substitute their
//! own implementation to script responses.

use crate::Result;
use async_trait::async_trait;
use crowd_core::client::HttpConfig;
use crowd_core::{ClientConfig, Error};
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("crowd-auth/", env!("CARGO_PKG_VERSION"));

/// HTTP Basic credentials attached to a request.
#[derive(Debug)]
pub struct BasicCredentials {
    /// Basic auth user name.
    pub username: String,
    /// Basic auth password.
    pub password: SecretString,
}

impl BasicCredentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password),
        }
    }
}

/// A single request handed to the transport.
#[derive(Debug)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL, query string included.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Serialized request body.
    pub body: Option<String>,
    /// Credentials sent preemptively as an `Authorization: Basic` header.
    pub credentials: BasicCredentials,
}

/// Status and fully-read body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Converts the response into [`Error::Transport`] carrying status and body.
    #[must_use]
    pub fn into_transport_error(self) -> Error {
        Error::transport(self.status.as_u16(), self.text())
    }
}

/// Capability to execute one HTTP exchange.
///
/// Implementations return `Ok` for every response that arrives, whatever its
/// status, and [`Error::Transport`] when no response could be obtained.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and reads the whole response body.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`HttpTransport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Builds a transport honouring the request timeout and TLS options of
    /// `config` and the connection and pool settings of `http_config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the CA certificate cannot be loaded or
    /// the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, http_config: HttpConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .connect_timeout(http_config.connect_timeout)
            .pool_idle_timeout(http_config.pool_idle_timeout)
            .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
            .gzip(http_config.enable_compression);

        if !config.tls_verify {
            warn!("TLS verification disabled for Crowd client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &config.tls_ca_cert {
            debug!("loading Crowd CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read Crowd CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::ConfigError(format!("Invalid Crowd CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(|err| {
            Error::ConfigError(format!("Failed to build Crowd HTTP client: {err}"))
        })?;

        Ok(Self { http })
    }

    /// Wraps an already configured `reqwest` client.
    #[must_use]
    pub const fn from_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
            credentials,
        } = request;

        let mut builder = self
            .http
            .request(method, url)
            .headers(headers)
            .basic_auth(
                credentials.username,
                Some(credentials.password.expose_secret()),
            );
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            Error::transport(status.as_u16(), format!("failed to read response body: {err}"))
        })?;

        Ok(TransportResponse::new(status, body.to_vec()))
    }
}
