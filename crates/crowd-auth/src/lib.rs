//! Crowd user directory client.
//!
//! This crate authenticates end users and fetches their basic profile from a
//! Crowd user directory over its REST API, presenting an application identity
//! to the directory with HTTP Basic credentials.

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod transport;

pub use client::{DirectoryClient, DirectoryClientBuilder};
pub use models::{FailureReason, PasswordCredential, RemoteErrorInfo, UserProfile};
pub use transport::{
    BasicCredentials, HttpTransport, ReqwestTransport, TransportRequest, TransportResponse,
};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = crowd_core::Result<T>;
