//! Unified error response handling for the proxy service
//!
//! Provides consistent error formatting across handlers, with request ID
//! correlation and standardized error codes.

use crate::proxy::headers::X_REQUEST_ID;
use crate::proxy::types::ProxyError;
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standard error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Unique error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Request ID for correlation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    /// Add request ID for correlation
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Convert to HTTP response with proper headers
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        let request_id = self.request_id.clone();
        let mut response = (status, Json(self)).into_response();

        if let Some(id) = request_id {
            if let Ok(header_value) = HeaderValue::from_str(&id) {
                response.headers_mut().insert(X_REQUEST_ID, header_value);
            }
        }

        response
    }
}

/// Extension trait for consistent error formatting
pub trait ErrorResponseExt {
    /// Convert to standardized error response
    fn to_error_response(&self) -> ErrorResponse;

    /// Get the appropriate HTTP status code
    fn status_code(&self) -> StatusCode;
}

impl ErrorResponseExt for ProxyError {
    fn to_error_response(&self) -> ErrorResponse {
        use ProxyError::*;

        match self {
            InvalidRequest => {
                ErrorResponse::new("INVALID_REQUEST", "Missing or empty channel id")
            }
            ChannelNotFound { id } => {
                ErrorResponse::new("CHANNEL_NOT_FOUND", format!("Channel not found: {id}"))
            }
            UpstreamFetchFailed(msg) => ErrorResponse::new(
                "UPSTREAM_FETCH_FAILED",
                format!("Upstream fetch failed: {msg}"),
            ),
            UpstreamTimeout(duration) => ErrorResponse::new(
                "UPSTREAM_TIMEOUT",
                format!("Upstream timed out after {duration:?}"),
            ),
        }
    }

    fn status_code(&self) -> StatusCode {
        use ProxyError::*;

        match self {
            InvalidRequest => StatusCode::BAD_REQUEST,
            ChannelNotFound { .. } => StatusCode::NOT_FOUND,
            UpstreamFetchFailed(_) => StatusCode::BAD_GATEWAY,
            UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

/// Request ID from the incoming headers, as stamped by the
/// set-request-id middleware.
pub fn extract_request_id(headers: &http::HeaderMap) -> Option<String> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
