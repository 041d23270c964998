//! Main proxy service implementation
//!
//! `ProxyService` is the entry point for channel playback requests. Each
//! request runs a single linear pipeline: parse the play path, look the
//! channel up in the registry, resolve the upstream target URL, fetch it,
//! then either rewrite manifest text or relay the segment body
//! incrementally. No state persists across requests.
//!
//! ## Service lifecycle
//!
//! ```rust,ignore
//! use streamgate::proxy::{ProxyConfig, ProxyService};
//!
//! let service = ProxyService::new(ProxyConfig::default(), registry, None)?;
//! let router = service.into_router();
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use crate::proxy::error_response::{extract_request_id, ErrorResponseExt};
use crate::proxy::headers::{
    paths, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, HLS_CONTENT_TYPE, HOST, REFERER,
    USER_AGENT, X_FORWARDED_PROTO,
};
use crate::proxy::manifest;
use crate::proxy::path_resolver::{parse_play_path, PathResolver};
use crate::proxy::types::*;
use crate::registry::ChannelRegistry;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

/// Proxy service handling channel playback requests
pub struct ProxyService {
    registry: Arc<dyn ChannelRegistry>,
    client: reqwest::Client,
    config: ProxyConfig,
    public_origin: Option<ProxyOrigin>,
}

impl ProxyService {
    /// Create a new proxy service.
    ///
    /// `public_origin` overrides per-request origin derivation when the
    /// proxy's externally visible address is known up front.
    pub fn new(
        config: ProxyConfig,
        registry: Arc<dyn ChannelRegistry>,
        public_origin: Option<ProxyOrigin>,
    ) -> crate::Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            registry,
            client,
            config,
            public_origin,
        })
    }

    /// Create an Axum router for the proxy service with middleware
    pub fn into_router(self) -> Router {
        Router::new()
            .route(paths::ROOT, get(root_handler))
            .route(paths::HEALTH, get(health_handler))
            .route(paths::PLAY, get(missing_channel_id_handler))
            .route("/play/", get(missing_channel_id_handler))
            .route("/play/{*rest}", get(play_handler))
            .with_state(Arc::new(self))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
    }

    /// Handle a playback request for `channel_id` + `sub_path`.
    #[instrument(skip(self, client_headers), fields(channel = %channel_id, sub_path = %sub_path))]
    pub async fn handle(
        &self,
        channel_id: ChannelId,
        sub_path: SubPath,
        client_headers: &HeaderMap,
    ) -> ProxyResult<Response> {
        let channel = self
            .registry
            .lookup(channel_id.as_ref())
            .await
            .ok_or_else(|| ProxyError::ChannelNotFound {
                id: channel_id.to_string(),
            })?;

        let target_url = PathResolver::resolve(&channel.origin_url, sub_path.as_ref());
        debug!(%target_url, "forwarding upstream");

        let user_agent = client_headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(&self.config.default_user_agent);

        let mut upstream_request = self
            .client
            .get(&target_url)
            .header(USER_AGENT, user_agent);

        // Many origins enforce referer checks keyed to their own domain.
        match origin_of(&channel.origin_url) {
            Some(referer) => upstream_request = upstream_request.header(REFERER, referer),
            None => debug!(origin_url = %channel.origin_url, "origin URL unparsable, omitting referer"),
        }

        // The timeout guards the response-header phase only; body streaming
        // of long segments is unaffected.
        let upstream_response =
            tokio::time::timeout(self.config.upstream_timeout, upstream_request.send())
                .await
                .map_err(|_| ProxyError::UpstreamTimeout(self.config.upstream_timeout))?
                .map_err(|e| ProxyError::UpstreamFetchFailed(e.to_string()))?;

        let status = upstream_response.status();
        let content_type = upstream_response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        // Origin errors are relayed verbatim, never masked or retried.
        if !status.is_success() {
            debug!(%status, "relaying upstream non-success response");
            return Ok(relay_response(upstream_response));
        }

        if manifest::is_manifest(content_type.as_deref(), &target_url, sub_path.as_ref()) {
            let text = upstream_response
                .text()
                .await
                .map_err(|e| ProxyError::UpstreamFetchFailed(e.to_string()))?;

            let proxy_origin = self.proxy_origin(client_headers);
            let rewritten = manifest::rewrite(
                &text,
                proxy_origin.as_ref(),
                channel_id.as_ref(),
                sub_path.as_ref(),
            );
            Ok(manifest_response(rewritten))
        } else {
            Ok(passthrough_response(status, content_type, upstream_response))
        }
    }

    /// Origin to rewrite manifest references against: the configured public
    /// origin, or one derived from the forwarded-proto and host headers.
    fn proxy_origin(&self, client_headers: &HeaderMap) -> ProxyOrigin {
        if let Some(origin) = &self.public_origin {
            return origin.clone();
        }

        let scheme = client_headers
            .get(X_FORWARDED_PROTO)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("http");
        let host = client_headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("localhost");
        ProxyOrigin::from(format!("{scheme}://{host}"))
    }
}

/// Scheme + host origin of an absolute URL, or `None` when it cannot be
/// parsed (the resolver tolerates such values; the referer is just omitted).
fn origin_of(origin_url: &str) -> Option<String> {
    let parsed = Url::parse(origin_url).ok()?;
    match parsed.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

/// Build the rewritten-manifest response.
fn manifest_response(rewritten: String) -> Response {
    let mut response = Response::new(Body::from(rewritten));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HLS_CONTENT_TYPE));
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// Relay an upstream non-success response verbatim: status, headers
/// (hop-by-hop ones excepted), and a streamed body. Nothing is added or
/// rewritten, including CORS headers.
fn relay_response(upstream_response: reqwest::Response) -> Response {
    let status = upstream_response.status();
    let upstream_headers = upstream_response.headers().clone();

    let mut response = Response::new(Body::from_stream(upstream_response.bytes_stream()));
    *response.status_mut() = status;
    for (name, value) in upstream_headers.iter() {
        if !is_hop_by_hop(name) {
            response.headers_mut().append(name, value.clone());
        }
    }
    response
}

fn is_hop_by_hop(name: &axum::http::HeaderName) -> bool {
    use axum::http::header;

    [
        header::CONNECTION,
        header::TRANSFER_ENCODING,
        header::TE,
        header::TRAILER,
        header::UPGRADE,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
    ]
    .contains(name)
        || name.as_str().eq_ignore_ascii_case("keep-alive")
}

/// Relay a binary segment without buffering its body. The upstream status
/// and content-type are preserved; dropping the stream on client
/// disconnect aborts the upstream request.
fn passthrough_response(
    status: StatusCode,
    content_type: Option<String>,
    upstream_response: reqwest::Response,
) -> Response {
    let mut response = Response::new(Body::from_stream(upstream_response.bytes_stream()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    if let Some(content_type) = content_type {
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
    }
    response
}

/// Render a proxy error as the standard JSON error body, correlated with
/// the request id the middleware stamped on the incoming request.
fn error_response(error: ProxyError, client_headers: &HeaderMap) -> Response {
    let status = error.status_code();
    let mut body = error.to_error_response();
    if let Some(request_id) = extract_request_id(client_headers) {
        body = body.with_request_id(request_id);
    }
    body.into_response_with_status(status)
}

/// Axum handler for `/play/{channelId}[.m3u8]/{subPath...}`
async fn play_handler(
    State(proxy): State<Arc<ProxyService>>,
    Path(rest): Path<String>,
    client_headers: HeaderMap,
) -> Response {
    let outcome = match parse_play_path(&rest) {
        Ok((channel_id, sub_path)) => proxy.handle(channel_id, sub_path, &client_headers).await,
        Err(error) => Err(error),
    };
    outcome.unwrap_or_else(|error| error_response(error, &client_headers))
}

/// `/play` with no channel segment at all
async fn missing_channel_id_handler(client_headers: HeaderMap) -> Response {
    error_response(ProxyError::InvalidRequest, &client_headers)
}

/// Root informational handler
async fn root_handler() -> &'static str {
    "Streamgate is running"
}

/// Health check handler
async fn health_handler() -> &'static str {
    "OK"
}

/// Request ID maker producing time-ordered v7 UUIDs
#[derive(Clone, Copy, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string())
            .ok()
            .map(RequestId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticChannelRegistry;

    #[test]
    fn test_origin_of_extracts_scheme_and_host() {
        assert_eq!(
            origin_of("http://server.example/live/stream.m3u8"),
            Some("http://server.example".to_string())
        );
        assert_eq!(
            origin_of("https://server.example:8443/live/stream.m3u8"),
            Some("https://server.example:8443".to_string())
        );
    }

    #[test]
    fn test_origin_of_malformed_url_is_none() {
        assert_eq!(origin_of("not a url"), None);
        assert_eq!(origin_of("data:text/plain,hello"), None);
    }

    #[tokio::test]
    async fn test_proxy_origin_prefers_configured_value() {
        let registry = Arc::new(StaticChannelRegistry::new(vec![]).unwrap());
        let service = ProxyService::new(
            ProxyConfig::default(),
            registry,
            Some(ProxyOrigin::from("https://proxy.example/".to_string())),
        )
        .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("ignored.example"));
        assert_eq!(
            service.proxy_origin(&headers).as_ref(),
            "https://proxy.example"
        );
    }

    #[tokio::test]
    async fn test_proxy_origin_derived_from_headers() {
        let registry = Arc::new(StaticChannelRegistry::new(vec![]).unwrap());
        let service = ProxyService::new(ProxyConfig::default(), registry, None).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("proxy.example:8080"));
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));
        assert_eq!(
            service.proxy_origin(&headers).as_ref(),
            "https://proxy.example:8080"
        );
    }
}
