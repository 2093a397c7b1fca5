//! Relay responses: upstream pass-through and the error body

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::RelayError;

/// Content type used when upstream does not send one (ebusd speaks JSON)
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Successful (2xx) upstream reply, always answered as 200
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Upstream `Content-Type`, if any
    pub content_type: Option<HeaderValue>,
    /// Upstream body, never parsed
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn new(content_type: Option<HeaderValue>, body: Bytes) -> Self {
        Self { content_type, body }
    }

    /// Content type the relay will answer with
    pub fn effective_content_type(&self) -> HeaderValue {
        self.content_type
            .clone()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let content_type = self.effective_content_type();
        (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}

/// Body of every failed relay response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl From<&RelayError> for ErrorBody {
    fn from(err: &RelayError) -> Self {
        Self { detail: err.to_string() }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn body_bytes(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[tokio::test]
    async fn test_passthrough_keeps_body_and_content_type() {
        let upstream = UpstreamResponse::new(
            Some(HeaderValue::from_static("text/plain; charset=utf-8")),
            Bytes::from_static(b"temp=21.5"),
        );

        let response = upstream.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_bytes(response).await, Bytes::from_static(b"temp=21.5"));
    }

    #[tokio::test]
    async fn test_missing_content_type_falls_back_to_json() {
        let upstream = UpstreamResponse::new(None, Bytes::from_static(b"{}"));
        let response = upstream.into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_empty_body_is_answered_as_200() {
        let upstream = UpstreamResponse::new(None, Bytes::new());
        let response = upstream.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_error_maps_to_500_with_detail() {
        let err = RelayError::Timeout {
            url: "http://ebusd.local:8889/data".to_string(),
            timeout: Duration::from_secs(5),
        };

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body: ErrorBody = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body.detail, "upstream timeout after 5s: http://ebusd.local:8889/data");
    }

    #[tokio::test]
    async fn test_status_error_names_status() {
        let err = RelayError::UpstreamStatus {
            url: "http://ebusd.local:8889/data".to_string(),
            status: StatusCode::NOT_FOUND,
        };

        let body: ErrorBody = serde_json::from_slice(&body_bytes(err.into_response()).await).unwrap();
        assert!(body.detail.contains("404"));
    }
}
