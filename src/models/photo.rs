//! Photo metadata as it travels over the API.
//!
//! The storage backend is the sole source of truth for these records; the
//! server never persists its own copy, so every listing is a live query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded photo. Created when an upload lands in storage, destroyed only
/// by an explicit clear of its stream.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoObject {
    /// Full storage key, assigned at presign time, unique per stream.
    pub key: String,

    /// The portion of the key after the stream prefix.
    pub filename: String,

    /// Backend-assigned timestamp; absent when the backend omits it.
    pub last_modified: Option<DateTime<Utc>>,

    /// Size in bytes.
    pub size: i64,
}

/// Response body of `GET /api/photos/{stream_id}`.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PhotoListing {
    pub stream_id: String,
    pub photos: Vec<PhotoObject>,
}

/// One-shot credential for a direct client-to-storage PUT. Not tracked after
/// issuance; completion is self-reported by the uploader.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub upload_url: String,
    pub key: String,
    pub filename: String,
}
