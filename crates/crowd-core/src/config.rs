//! Configuration structures for Crowd directory clients.
//!
//! This module provides the application credentials and server location a
//! client needs, along with validation and derivation of the REST base URL.

use crate::client::CROWD_DEFAULT_TIMEOUT;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::{Host, Url};
use validator::Validate;

/// Path of the user management REST API below the server root.
pub const USER_MANAGEMENT_PATH: &str = "/crowd/rest/usermanagement/latest/";

/// URL scheme used to reach the directory server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP
    Http,
    /// HTTP over TLS
    #[default]
    Https,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(Error::ConfigError(format!(
                "unsupported scheme `{other}`, expected http or https"
            ))),
        }
    }
}

/// Configuration for a Crowd directory client.
///
/// Holds the application identity the client presents to the directory (not
/// the end user being authenticated) and where the directory lives.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// Application name registered in the directory
    #[validate(length(min = 1))]
    pub application_username: String,

    /// Application password registered in the directory
    #[serde(skip_serializing)]
    pub application_password: SecretString,

    /// Directory server host name or address
    #[validate(length(min = 1))]
    pub host: String,

    /// Directory server port
    #[validate(range(min = 1))]
    pub port: u16,

    /// URL scheme
    #[serde(default)]
    pub scheme: Scheme,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to custom CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<PathBuf>,
}

const fn default_tls_verify() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    CROWD_DEFAULT_TIMEOUT
}

impl ClientConfig {
    /// Create a new client configuration with required parameters.
    ///
    /// # Arguments
    ///
    /// * `application_username` - Application name registered in the directory
    /// * `application_password` - Application password
    /// * `host` - Directory host, e.g. `crowd.example.com`
    /// * `port` - Directory port
    /// * `scheme` - `http` or `https`
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the base URL cannot be derived.
    pub fn new(
        application_username: impl Into<String>,
        application_password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        scheme: Scheme,
    ) -> Result<Self> {
        let password: String = application_password.into();
        let config = Self {
            application_username: application_username.into(),
            application_password: SecretString::from(password),
            host: host.into(),
            port,
            scheme,
            request_timeout_secs: default_request_timeout_secs(),
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
        };

        config.ensure_valid()?;
        Ok(config)
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validates field ranges and that a base URL can be derived.
    ///
    /// Configurations built through serde skip [`ClientConfig::new`], so clients
    /// call this again before use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] or [`Error::InvalidEndpoint`].
    pub fn ensure_valid(&self) -> Result<()> {
        self.validate()?;
        self.base_url().map(|_| ())
    }

    /// Renders `scheme://host[:port]/crowd/rest/usermanagement/latest/`.
    ///
    /// The port segment is left out for 80 and 443.
    #[must_use]
    pub fn base_url_string(&self) -> String {
        match self.port {
            80 | 443 => format!("{}://{}{USER_MANAGEMENT_PATH}", self.scheme, self.host),
            port => format!(
                "{}://{}:{port}{USER_MANAGEMENT_PATH}",
                self.scheme, self.host
            ),
        }
    }

    /// Parse the derived base URL.
    ///
    /// `host` must be a bare host name or address; a port, path, query or
    /// userinfo embedded in it is rejected rather than merged into the URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the host does not form a valid URL.
    pub fn base_url(&self) -> Result<Url> {
        Host::parse(&self.host).map_err(|e| {
            Error::InvalidEndpoint(format!("host `{}` is not a bare host name: {e}", self.host))
        })?;

        Ok(Url::parse(&self.base_url_string())?)
    }
}
