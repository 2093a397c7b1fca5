//! busrelay Relay
//!
//! Forwards `GET /data` to a fixed ebusd HTTP service and hands the body
//! back to browser clients with cross-origin headers attached.
//!
//! ## Responsibilities
//!
//! 1. Build the upstream URL once at startup
//! 2. Issue one bounded GET per inbound request, never retried
//! 3. Pass successful bodies through untouched, content type included
//! 4. Map every upstream failure to `500 {"detail": "..."}`
//! 5. Apply the cross-origin policy to every response

mod config;
mod cors;
mod handler;
mod response;
mod server;

pub use config::{AllowedOrigins, RelayConfig, DEFAULT_TIMEOUT};
pub use cors::cors_layer;
pub use handler::RelayHandler;
pub use response::{ErrorBody, UpstreamResponse, DEFAULT_CONTENT_TYPE};
pub use server::{router, start, RelayHandle, DATA_ROUTE};

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("upstream timeout after {secs}s: {url}", secs = .timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },

    #[error("upstream returned HTTP {status} for {url}")]
    UpstreamStatus { url: String, status: StatusCode },

    #[error("upstream request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Invalid upstream URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid allowed origin {0:?}")]
    InvalidOrigin(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Settings error: {0}")]
    Settings(#[from] busrelay_settings::SettingsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
