//! Type definitions for the proxy module

use nutype::nutype;
use std::time::Duration;
use thiserror::Error;

use crate::proxy::headers::DEFAULT_USER_AGENT;

/// Channel identifier taken from the request path, after the optional
/// `.m3u8` suffix has been stripped. Never empty.
#[nutype(
    derive(Clone, Debug, Display, PartialEq, Eq, Hash, TryFrom, AsRef, Deserialize, Serialize),
    validate(predicate = |s: &str| !s.is_empty()),
)]
pub struct ChannelId(String);

/// Portion of the request path following the channel id, `/`-joined.
/// Empty when the request targets the channel's primary manifest.
#[nutype(derive(Clone, Debug, Display, From, AsRef, Deserialize, Serialize))]
pub struct SubPath(String);

impl SubPath {
    pub fn is_empty(&self) -> bool {
        self.as_ref().is_empty()
    }
}

/// Externally visible origin of the proxy itself (scheme + host), used as
/// the base of rewritten manifest references. A trailing slash is stripped
/// so references compose cleanly.
#[nutype(
    derive(Clone, Debug, Display, From, AsRef, Deserialize, Serialize),
    sanitize(with = |s: String| s.trim_end_matches('/').to_string()),
)]
pub struct ProxyOrigin(String);

/// Proxy configuration derived from [`Settings`](crate::config::Settings)
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Timeout for the response-header phase of an upstream fetch
    pub upstream_timeout: Duration,
    /// User-Agent sent upstream when the client did not provide one
    pub default_user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_secs(15),
            default_user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Errors that can occur in the proxy
///
/// Non-2xx upstream responses are deliberately not an error: they are
/// relayed to the client verbatim.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid request: missing channel id")]
    InvalidRequest,

    #[error("Channel not found: {id}")]
    ChannelNotFound { id: String },

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetchFailed(String),

    #[error("Upstream timed out after {0:?}")]
    UpstreamTimeout(Duration),
}

/// Result type for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;
