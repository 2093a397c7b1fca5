//! Immutable relay configuration

use std::net::SocketAddr;
use std::time::Duration;

use busrelay_settings::{CorsSettings, Settings};
use reqwest::Url;

use crate::{RelayError, Result};

/// Upstream request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Origins allowed to read relay responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `Access-Control-Allow-Origin: *`
    Any,
    /// Exact-match allow-list; other origins get no allow-origin header
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Build from settings; a `*` entry anywhere means `Any`
    pub fn from_cors(cors: &CorsSettings) -> Self {
        if cors.allows_any() {
            Self::Any
        } else {
            Self::List(cors.allowed_origins.clone())
        }
    }
}

impl Default for AllowedOrigins {
    fn default() -> Self {
        Self::List(vec![
            "http://localhost:5173".to_string(),
            "http://127.0.0.1:5173".to_string(),
        ])
    }
}

/// Relay configuration, fixed for the process lifetime
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Full upstream URL, e.g. `http://192.168.0.92:8889/data`
    pub upstream_url: Url,
    /// Bound on the whole upstream exchange (connect, headers and body)
    pub timeout: Duration,
    /// Cross-origin policy
    pub allowed_origins: AllowedOrigins,
    /// Inbound listen address
    pub listen_addr: SocketAddr,
}

impl RelayConfig {
    /// Config for `upstream_url` with default timeout, origins and listen address
    pub fn new(upstream_url: &str) -> Result<Self> {
        Ok(Self {
            upstream_url: parse_upstream_url(upstream_url)?,
            timeout: DEFAULT_TIMEOUT,
            allowed_origins: AllowedOrigins::default(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        })
    }

    /// Validate settings and freeze them into a relay config
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            upstream_url: parse_upstream_url(&settings.upstream.url())?,
            timeout: Duration::from_secs(settings.upstream.timeout_secs),
            allowed_origins: AllowedOrigins::from_cors(&settings.cors),
            listen_addr: settings.server.socket_addr()?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_allowed_origins(mut self, allowed_origins: AllowedOrigins) -> Self {
        self.allowed_origins = allowed_origins;
        self
    }

    pub fn with_listen_addr(mut self, listen_addr: SocketAddr) -> Self {
        self.listen_addr = listen_addr;
        self
    }
}

fn parse_upstream_url(url: &str) -> Result<Url> {
    let invalid = |reason: &str| RelayError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(parsed)
}
