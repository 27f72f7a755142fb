use crate::models::stream::InvalidStreamId;
use crate::services::storage_gateway::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request-level failure taxonomy.
///
/// Client mistakes are 400s and are never retried; backend failures are 500s,
/// logged, and left for the client to retry manually. Every handler error is
/// converted to a JSON response — nothing here takes the server process down.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid stream identifier")]
    InvalidIdentifier,

    #[error("missing object key")]
    MissingKey,

    #[error("failed to prepare upload: {0}")]
    UploadPreparationFailed(#[source] StorageError),

    #[error("failed to list photos: {0}")]
    ListingFailed(#[source] StorageError),

    #[error("failed to clear stream: {0}")]
    DeleteFailed(#[source] StorageError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidIdentifier | ApiError::MissingKey => StatusCode::BAD_REQUEST,
            ApiError::UploadPreparationFailed(_)
            | ApiError::ListingFailed(_)
            | ApiError::DeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvalidStreamId> for ApiError {
    fn from(_: InvalidStreamId) -> Self {
        ApiError::InvalidIdentifier
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
