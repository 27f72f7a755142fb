//! Route table for the photo stream API.
//!
//! ## Structure
//! - **Listing & lifecycle**
//!   - `GET  /api/photos/{stream_id}` — list a stream's photos, oldest first
//!   - `POST /api/clear/{stream_id}`  — delete everything under a stream
//!
//! - **Upload flow**
//!   - `POST /api/presign`  — issue a presigned upload URL
//!   - `POST /api/complete` — uploader reports a finished PUT
//!
//! - **Push transport**
//!   - `GET /ws` — viewer session channel (joinStream / photoAdded / streamCleared)

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        photo_handlers::{clear_stream, complete_upload, list_photos, presign_upload},
        ws_handlers::ws_upgrade,
    },
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Bodies are small JSON control messages; photo bytes never transit this
/// server, so 1 MiB is plenty.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build and return the router for all photo stream routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // listing + upload flow
        .route("/api/photos/{stream_id}", get(list_photos))
        .route("/api/presign", post(presign_upload))
        .route("/api/complete", post(complete_upload))
        .route("/api/clear/{stream_id}", post(clear_stream))
        // push transport
        .route("/ws", get(ws_upgrade))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
