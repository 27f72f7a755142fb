//! Key namespace: maps stream identifiers to storage key prefixes and mints
//! collision-resistant object keys for new uploads.

use crate::models::stream::StreamId;
use chrono::Utc;

/// Storage key prefix for a stream: `<base>/<streamId>/`.
pub fn prefix_for(base: &str, stream: &StreamId) -> String {
    format!("{}/{}/", base, stream)
}

/// File extension derived from the declared content type.
pub fn extension_for(content_type: &str) -> &'static str {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("png") {
        "png"
    } else if ct.contains("webp") {
        "webp"
    } else if ct.contains("heic") || ct.contains("heif") {
        "heic"
    } else {
        "jpg"
    }
}

/// Compose a fresh object key: `<prefix><epochMillis>-<16 hex chars>.<ext>`.
///
/// The embedded timestamp makes keys sort lexicographically close to
/// chronological order; the canonical order still comes from storage metadata.
/// Uniqueness rests on the 64-bit nonce, not on any enforcement.
pub fn new_key(base: &str, stream: &StreamId, content_type: &str) -> String {
    let nonce: u64 = rand::random();
    format!(
        "{}{}-{:016x}.{}",
        prefix_for(base, stream),
        Utc::now().timestamp_millis(),
        nonce,
        extension_for(content_type)
    )
}

/// Last path segment of a key, used as the display filename.
pub fn filename_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
