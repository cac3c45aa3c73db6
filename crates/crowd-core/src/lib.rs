//! # crowd-core
//!
//! Core types and utilities for talking to a Crowd user directory.
//!
//! This crate provides the shared error type, client configuration, and HTTP
//! tuning used by the directory clients.
//!
//! ## Modules
//!
//! - [`error`] - Error types and status classification
//! - [`config`] - Application credentials, server location, and base URL derivation
//! - [`client`] - HTTP client tuning (timeouts and connection pooling)

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{ClientConfig, Scheme};
pub use error::{Error, Result};
