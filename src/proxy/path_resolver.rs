//! Target URL resolution and path handling for proxy requests

use crate::proxy::headers::MANIFEST_EXTENSION;
use crate::proxy::types::*;
use tracing::warn;
use url::Url;

/// Strategy for mapping a proxy-relative request path onto the origin
pub struct PathResolver;

impl PathResolver {
    /// Resolve the origin URL to fetch for a channel request.
    ///
    /// An empty `sub_path` targets the channel's primary manifest, so the
    /// stored origin URL is returned unchanged. Otherwise the sub-path is
    /// resolved against the directory component of the origin URL using
    /// RFC 3986 relative-reference resolution; if that fails because the
    /// stored URL is malformed, the two are naively concatenated rather
    /// than failing the request.
    pub fn resolve(origin_url: &str, sub_path: &str) -> String {
        if sub_path.is_empty() {
            return origin_url.to_string();
        }

        // Directory component of the origin URL, final '/' included.
        // e.g. http://server/live/stream.m3u8 -> http://server/live/
        let base = match origin_url.rfind('/') {
            Some(idx) => &origin_url[..=idx],
            None => "",
        };

        match Url::parse(base).and_then(|base_url| base_url.join(sub_path)) {
            Ok(resolved) => resolved.to_string(),
            Err(error) => {
                warn!(
                    origin_url,
                    sub_path,
                    %error,
                    "origin URL not resolvable, falling back to concatenation"
                );
                format!("{base}{sub_path}")
            }
        }
    }
}

/// Split the wildcard remainder of a `/play/...` request into the channel
/// id and the sub-path.
///
/// The first segment is the channel id, with an optional `.m3u8` suffix
/// stripped before registry lookup. Everything after it is the sub-path,
/// kept `/`-joined. An empty id segment is rejected before any registry
/// access.
pub fn parse_play_path(rest: &str) -> ProxyResult<(ChannelId, SubPath)> {
    let (raw_id, sub_path) = match rest.split_once('/') {
        Some((id, tail)) => (id, tail),
        None => (rest, ""),
    };

    let raw_id = raw_id.strip_suffix(MANIFEST_EXTENSION).unwrap_or(raw_id);
    let channel_id =
        ChannelId::try_new(raw_id.to_string()).map_err(|_| ProxyError::InvalidRequest)?;

    Ok((channel_id, SubPath::from(sub_path.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_empty_sub_path_returns_origin_unchanged() {
        let origin = "http://h/live/stream.m3u8";
        assert_eq!(PathResolver::resolve(origin, ""), origin);
    }

    #[test]
    fn test_resolve_relative_sub_path() {
        let resolved =
            PathResolver::resolve("http://h/live/stream.m3u8", "tracks-v1a1/mono.m3u8");
        assert_eq!(resolved, "http://h/live/tracks-v1a1/mono.m3u8");
    }

    #[test]
    fn test_resolve_preserves_query() {
        let resolved = PathResolver::resolve("http://h/live/stream.m3u8", "seg1.ts?token=abc");
        assert_eq!(resolved, "http://h/live/seg1.ts?token=abc");
    }

    #[test]
    fn test_resolve_normalizes_dot_segments() {
        let resolved = PathResolver::resolve("http://h/live/stream.m3u8", "../audio/mono.m3u8");
        assert_eq!(resolved, "http://h/audio/mono.m3u8");
    }

    #[test]
    fn test_resolve_absolute_sub_path_overrides_base() {
        let resolved =
            PathResolver::resolve("http://h/live/stream.m3u8", "http://other/x.m3u8");
        assert_eq!(resolved, "http://other/x.m3u8");
    }

    #[test]
    fn test_resolve_falls_back_to_concatenation() {
        // Malformed origin URL: the base has no scheme, so standards-based
        // resolution fails and the pieces are joined directly.
        let resolved = PathResolver::resolve("live/stream.m3u8", "chunk1.ts");
        assert_eq!(resolved, "live/chunk1.ts");
    }

    #[test]
    fn test_resolve_origin_without_slash_concatenates_bare() {
        let resolved = PathResolver::resolve("garbage", "chunk1.ts");
        assert_eq!(resolved, "chunk1.ts");
    }

    #[test]
    fn test_parse_play_path_with_sub_path() {
        let (id, sub_path) = parse_play_path("c1/tracks-v1a1/mono.m3u8").unwrap();
        assert_eq!(id.as_ref(), "c1");
        assert_eq!(sub_path.as_ref(), "tracks-v1a1/mono.m3u8");
    }

    #[test]
    fn test_parse_play_path_strips_manifest_suffix() {
        let (id, sub_path) = parse_play_path("c1.m3u8").unwrap();
        assert_eq!(id.as_ref(), "c1");
        assert!(sub_path.is_empty());
    }

    #[test]
    fn test_parse_play_path_empty_id_rejected() {
        // /play//index.m3u8 arrives as a leading empty segment
        assert!(matches!(
            parse_play_path("/index.m3u8"),
            Err(ProxyError::InvalidRequest)
        ));
        assert!(matches!(parse_play_path(""), Err(ProxyError::InvalidRequest)));
    }

    #[test]
    fn test_parse_play_path_suffix_only_id_rejected() {
        assert!(matches!(
            parse_play_path(".m3u8/seg1.ts"),
            Err(ProxyError::InvalidRequest)
        ));
    }
}
