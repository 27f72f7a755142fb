//! HTTP handlers for the photo stream API. Bodies are small JSON control
//! messages; photo bytes go straight between the client and storage.

use crate::{
    errors::ApiError,
    models::photo::{PhotoListing, UploadTicket},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Request body for `POST /api/presign`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub stream_id: String,
    pub content_type: String,
}

/// Request body for `POST /api/complete`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub stream_id: String,
    pub key: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// GET `/api/photos/{stream_id}` — list a stream's photos, oldest first.
pub async fn list_photos(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> Result<Json<PhotoListing>, ApiError> {
    let photos = state.streams.list_photos(&stream_id).await?;
    Ok(Json(PhotoListing { stream_id, photos }))
}

/// POST `/api/presign` — issue an upload ticket for a direct PUT to storage.
pub async fn presign_upload(
    State(state): State<AppState>,
    Json(req): Json<PresignRequest>,
) -> Result<Json<UploadTicket>, ApiError> {
    let ticket = state
        .streams
        .request_upload(&req.stream_id, &req.content_type)
        .await?;
    Ok(Json(ticket))
}

/// POST `/api/complete` — uploader reports a finished PUT; the stream's room
/// is notified.
pub async fn complete_upload(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .streams
        .complete_upload(&req.stream_id, &req.key, req.filename)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// POST `/api/clear/{stream_id}` — delete every photo in the stream.
pub async fn clear_stream(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let deleted = state.streams.clear_stream(&stream_id).await?;
    Ok(Json(json!({ "ok": true, "deleted": deleted })))
}
