//! Manifest classification and reference rewriting
//!
//! Pure text transforms: no I/O, no side effects. Rewriting never fails;
//! malformed manifest text is handled best-effort line by line.

use crate::proxy::headers::paths::PLAY;
use crate::proxy::headers::{MANIFEST_EXTENSION, MANIFEST_TYPE_MARKER};

/// Classify an upstream response as a manifest or a binary segment.
///
/// A response is a manifest when its declared content-type contains the
/// HLS manifest MIME token, or when either the resolved target URL or the
/// requested sub-path carries the manifest file extension.
pub fn is_manifest(content_type: Option<&str>, target_url: &str, sub_path: &str) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains(MANIFEST_TYPE_MARKER))
        .unwrap_or(false)
        || target_url.ends_with(MANIFEST_EXTENSION)
        || sub_path.ends_with(MANIFEST_EXTENSION)
}

/// Rewrite every bare reference line of a manifest so it points back
/// through the proxy.
///
/// Blank lines and `#`-prefixed directive lines pass through unmodified;
/// attribute URIs embedded in directives are never touched. Any other line
/// is treated as a media/manifest reference and replaced with
/// `{proxy_origin}/play/{channel_id}/{path_prefix}{reference}`, where
/// `path_prefix` is the directory part of the current sub-path. This keeps
/// the origin's relative directory structure intact across nested
/// sub-manifests.
///
/// References that are already absolute URLs are rewritten the same way as
/// relative ones, so variants hosted on a different origin than the
/// channel's will not resolve. Deliberately left as-is: routing such
/// references would need a decision on how cross-host channels are keyed.
pub fn rewrite(
    content: &str,
    proxy_origin: &str,
    channel_id: &str,
    current_sub_path: &str,
) -> String {
    let path_prefix = directory_prefix(current_sub_path);

    content
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                line.to_string()
            } else {
                format!("{proxy_origin}{PLAY}/{channel_id}/{path_prefix}{trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Directory portion of a sub-path, final '/' included; empty when the
/// sub-path has no directory component.
fn directory_prefix(sub_path: &str) -> &str {
    match sub_path.rfind('/') {
        Some(idx) => &sub_path[..=idx],
        None => "",
    }
}
