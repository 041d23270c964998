//! HTTP header constants and utilities for the proxy service
//!
//! This module centralizes header names, content-type markers, and
//! well-known paths used throughout the proxy service.

use ::http::header;

/// Content type returned for rewritten manifests
pub const HLS_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Case-insensitive substring that marks an upstream content-type as a manifest
pub const MANIFEST_TYPE_MARKER: &str = "mpegurl";

/// File extension that marks a URL or sub-path as a manifest
pub const MANIFEST_EXTENSION: &str = ".m3u8";

/// User-Agent sent upstream when the client did not provide one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Header carrying the original scheme when running behind a TLS terminator
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Header name for request ID used for tracing and correlation
pub const X_REQUEST_ID: &str = "x-request-id";

/// Standard header re-exports for convenience
pub use header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, HOST, REFERER, USER_AGENT,
};

/// Well-known paths
pub mod paths {
    /// Root informational endpoint
    pub const ROOT: &str = "/";

    /// Health check endpoint path
    pub const HEALTH: &str = "/health";

    /// Prefix for channel playback requests
    pub const PLAY: &str = "/play";
}
