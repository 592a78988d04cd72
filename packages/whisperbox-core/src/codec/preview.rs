//! Bounded-length payload previews for inbox listings.

use super::payload::{Payload, HEX_PREFIX};

/// Longest preview returned unchanged
pub const PREVIEW_LIMIT: usize = 64;

/// Appended to truncated previews
pub const ELLIPSIS: &str = "...";

/// Render a payload for display, truncated to [`PREVIEW_LIMIT`]
///
/// Raw bytes are shown as `0x`-hex. Anything longer than the limit keeps
/// its first `limit - 4` characters and gains `...`.
pub fn format_preview(payload: &Payload) -> String {
    format_preview_with_limit(payload, PREVIEW_LIMIT)
}

/// Like [`format_preview`] with a caller-chosen limit
///
/// Limits too small to hold any text next to the ellipsis fall back to
/// [`PREVIEW_LIMIT`].
pub fn format_preview_with_limit(payload: &Payload, limit: usize) -> String {
    let limit = if limit <= ELLIPSIS.len() { PREVIEW_LIMIT } else { limit };

    let rendered = match payload {
        Payload::Text(text) => text.clone(),
        Payload::Bytes(bytes) => format!("{}{}", HEX_PREFIX, hex::encode(bytes)),
    };

    if rendered.chars().count() <= limit {
        return rendered;
    }

    let kept: String = rendered.chars().take(limit - ELLIPSIS.len() - 1).collect();
    format!("{kept}{ELLIPSIS}")
}
