//! Error types for Crowd directory operations.
//!
//! Failures are split into two families callers must tell apart: the directory
//! rejected the end user's credentials ([`Error::AuthenticationFailed`]) or the
//! exchange with the directory itself broke ([`Error::Transport`]).

use thiserror::Error;

/// Main error type for Crowd directory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The directory rejected the end user's credentials.
    #[error("Authentication failed: {reason}: {message}")]
    AuthenticationFailed {
        /// Directory reason code, e.g. `INVALID_USER_AUTHENTICATION`
        reason: String,
        /// Human-readable message from the directory
        message: String,
    },

    /// The request could not be completed or the directory answered with an
    /// unexpected status or body.
    #[error("Transport error{}: {body}", status_label(.status))]
    Transport {
        /// HTTP status, absent when no response was received
        status: Option<u16>,
        /// Raw response body or the underlying failure description
        body: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Crowd directory operations.
pub type Result<T> = std::result::Result<T, Error>;

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl Error {
    /// Builds a transport error for a response that carried a status.
    #[must_use]
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            body: body.into(),
        }
    }

    /// Builds a transport error for a failure before any response arrived.
    #[must_use]
    pub fn connection(description: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            body: description.into(),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "AUTHENTICATION_FAILED",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// HTTP status carried by a transport error, if one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Directory reason code carried by an authentication failure.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::AuthenticationFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Returns true when the directory rejected the user's credentials.
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Returns true when the directory could not be reached or misbehaved.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|status| status.as_u16()),
            body: err.to_string(),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::connection(format!("malformed JSON: {err}"))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}
