//! Relay handler
//!
//! One inbound request maps to exactly one upstream GET:
//! 1. Send GET to the configured upstream URL
//! 2. Reject non-2xx statuses, redirects included
//! 3. Read the body within the same timeout budget
//! 4. Hand back body and content type untouched
//!
//! Nothing is retried. Dropping the returned future abandons the upstream call.

use std::error::Error as _;
use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

use crate::{RelayConfig, RelayError, Result, UpstreamResponse};

/// Stateless forwarder shared by all inbound requests
#[derive(Debug, Clone)]
pub struct RelayHandler {
    config: RelayConfig,
    http_client: reqwest::Client,
}

impl RelayHandler {
    /// Create a new relay handler
    pub fn new(config: RelayConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            // A 3xx from ebusd is a failure, not a pointer to follow
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| RelayError::ClientBuild(e.to_string()))?;

        Ok(Self { config, http_client })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Fetch the upstream data once
    pub async fn fetch(&self) -> Result<UpstreamResponse> {
        let url = self.config.upstream_url.as_str();
        let started = Instant::now();
        debug!(url, "Fetching upstream data");

        let response = self
            .http_client
            .get(self.config.upstream_url.clone())
            .send()
            .await
            .map_err(|e| self.upstream_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "Upstream returned error status");
            return Err(RelayError::UpstreamStatus {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(|e| self.upstream_error(e))?;

        info!(
            url,
            %status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Relayed upstream data"
        );

        Ok(UpstreamResponse::new(content_type, body))
    }

    /// Collapse a client error into a relay failure
    fn upstream_error(&self, err: reqwest::Error) -> RelayError {
        let url = self.config.upstream_url.to_string();

        let relay_err = if err.is_timeout() {
            RelayError::Timeout {
                url,
                timeout: self.config.timeout,
            }
        } else {
            RelayError::Transport {
                url,
                reason: error_chain(&err),
            }
        };

        warn!("{}", relay_err);
        relay_err
    }
}

/// `err: source: source...`, skipping repeats
fn error_chain(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}
