//! Upload coordinator: the presign → client PUT → completion-notice flow, the
//! live listing, and stream clearing.
//!
//! Stateless across calls. The server keeps no record of issued tickets and no
//! copy of the photo set; the storage backend is the sole source of truth and
//! the broadcaster is a pure fan-out.

use crate::errors::ApiError;
use crate::models::{
    events::ServerEvent,
    photo::{PhotoObject, UploadTicket},
    stream::StreamId,
};
use crate::services::{
    keys,
    rooms::RoomBroadcaster,
    storage_gateway::{StorageError, StorageGateway},
};
use chrono::Utc;
use std::{sync::Arc, time::Duration};

/// Window the uploading client has to perform its PUT. Bounds only the client;
/// server request handling carries no timeout of its own.
pub const PRESIGN_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone)]
pub struct StreamService {
    gateway: Arc<dyn StorageGateway>,
    rooms: RoomBroadcaster,
    base_prefix: String,
}

impl StreamService {
    pub fn new(
        gateway: Arc<dyn StorageGateway>,
        rooms: RoomBroadcaster,
        base_prefix: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            rooms,
            base_prefix: base_prefix.into(),
        }
    }

    /// Mint a key and a presigned PUT URL for it. Leaves no state behind on
    /// failure — no placeholder object is created.
    pub async fn request_upload(
        &self,
        stream: &str,
        content_type: &str,
    ) -> Result<UploadTicket, ApiError> {
        let stream = StreamId::parse(stream)?;
        let key = keys::new_key(&self.base_prefix, &stream, content_type);
        let upload_url = self
            .gateway
            .presign_put(&key, content_type, PRESIGN_TTL)
            .await
            .map_err(ApiError::UploadPreparationFailed)?;
        let filename = keys::filename_from_key(&key).to_string();

        tracing::debug!("issued upload ticket for {} -> {}", stream, key);
        Ok(UploadTicket {
            upload_url,
            key,
            filename,
        })
    }

    /// Live listing of a stream, oldest first.
    ///
    /// The entry equal to the prefix itself (folder placeholder artifact) is
    /// excluded. Objects the backend reports without a timestamp sort before
    /// everything else; keys break ties, so the order is total.
    pub async fn list_photos(&self, stream: &str) -> Result<Vec<PhotoObject>, ApiError> {
        let stream = StreamId::parse(stream)?;
        let prefix = keys::prefix_for(&self.base_prefix, &stream);
        let listed = self
            .gateway
            .list(&prefix)
            .await
            .map_err(ApiError::ListingFailed)?;

        let mut photos: Vec<PhotoObject> = listed
            .into_iter()
            .filter(|obj| obj.key != prefix)
            .map(|obj| PhotoObject {
                filename: keys::filename_from_key(&obj.key).to_string(),
                key: obj.key,
                last_modified: obj.last_modified,
                size: obj.size,
            })
            .collect();
        photos.sort_by(|a, b| {
            a.last_modified
                .cmp(&b.last_modified)
                .then_with(|| a.key.cmp(&b.key))
        });
        Ok(photos)
    }

    /// Accept an uploader's completion notice and broadcast it.
    ///
    /// Completion is trust-based: the object's existence is not verified, so
    /// the notice may race ahead of the backend's read-after-write visibility.
    /// Viewers that miss or distrust the push reconcile on their next poll.
    pub async fn complete_upload(
        &self,
        stream: &str,
        key: &str,
        filename: Option<String>,
    ) -> Result<(), ApiError> {
        let stream = StreamId::parse(stream)?;
        if key.is_empty() {
            return Err(ApiError::MissingKey);
        }

        let filename = filename
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| keys::filename_from_key(key).to_string());
        let event = ServerEvent::PhotoAdded {
            stream_id: stream.to_string(),
            key: key.to_string(),
            filename,
            at: Utc::now().timestamp_millis(),
        };
        self.rooms.publish(&stream, &event).await;
        Ok(())
    }

    /// Delete every object under the stream and announce the clear.
    ///
    /// An already-empty stream is a no-op success: returns 0 without issuing a
    /// delete call.
    pub async fn clear_stream(&self, stream: &str) -> Result<usize, ApiError> {
        let stream = StreamId::parse(stream)?;
        let prefix = keys::prefix_for(&self.base_prefix, &stream);
        let listed = self
            .gateway
            .list(&prefix)
            .await
            .map_err(ApiError::DeleteFailed)?;
        if listed.is_empty() {
            return Ok(0);
        }

        let doomed: Vec<String> = listed.into_iter().map(|obj| obj.key).collect();
        self.gateway
            .delete_all(&doomed)
            .await
            .map_err(ApiError::DeleteFailed)?;
        tracing::info!("cleared stream {}: {} objects", stream, doomed.len());

        let event = ServerEvent::StreamCleared {
            stream_id: stream.to_string(),
            at: Utc::now().timestamp_millis(),
        };
        self.rooms.publish(&stream, &event).await;
        Ok(doomed.len())
    }

    /// Readiness probe: one list call against a prefix that never matches.
    pub async fn probe_gateway(&self) -> Result<(), StorageError> {
        let probe = format!("{}/.readyz/", self.base_prefix);
        self.gateway.list(&probe).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage_gateway::MemoryGateway;
    use chrono::DateTime;
    use tokio::sync::mpsc::unbounded_channel;
    use uuid::Uuid;

    const STREAM: &str = "ABCD-EFGH";

    fn service_with(gateway: MemoryGateway) -> (StreamService, RoomBroadcaster) {
        let rooms = RoomBroadcaster::new();
        (
            StreamService::new(Arc::new(gateway), rooms.clone(), "photo-stream"),
            rooms,
        )
    }

    fn at(secs: i64) -> Option<chrono::DateTime<chrono::Utc>> {
        DateTime::from_timestamp(secs, 0)
    }

    #[tokio::test]
    async fn every_operation_rejects_malformed_identifiers() {
        let (service, _rooms) = service_with(MemoryGateway::new());
        for candidate in ["bad-id", "abcd-efgh", ""] {
            assert!(matches!(
                service.request_upload(candidate, "image/png").await,
                Err(ApiError::InvalidIdentifier)
            ));
            assert!(matches!(
                service.list_photos(candidate).await,
                Err(ApiError::InvalidIdentifier)
            ));
            assert!(matches!(
                service.complete_upload(candidate, "some-key", None).await,
                Err(ApiError::InvalidIdentifier)
            ));
            assert!(matches!(
                service.clear_stream(candidate).await,
                Err(ApiError::InvalidIdentifier)
            ));
        }
    }

    #[tokio::test]
    async fn request_upload_issues_a_scoped_ticket() {
        let (service, _rooms) = service_with(MemoryGateway::new());

        let ticket = service.request_upload(STREAM, "image/png").await.unwrap();

        assert!(ticket.key.starts_with("photo-stream/ABCD-EFGH/"));
        assert!(ticket.key.ends_with(".png"));
        assert_eq!(
            ticket.filename,
            ticket.key.strip_prefix("photo-stream/ABCD-EFGH/").unwrap()
        );
        assert!(ticket.upload_url.contains(&ticket.key));
    }

    #[tokio::test]
    async fn listing_sorts_by_timestamp_not_by_key() {
        let gateway = MemoryGateway::new();
        gateway.put("photo-stream/ABCD-EFGH/c.jpg", at(100), 1);
        gateway.put("photo-stream/ABCD-EFGH/a.jpg", at(300), 2);
        gateway.put("photo-stream/ABCD-EFGH/b.jpg", at(200), 3);
        let (service, _rooms) = service_with(gateway);

        let photos = service.list_photos(STREAM).await.unwrap();

        let filenames: Vec<&str> = photos.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(filenames, ["c.jpg", "b.jpg", "a.jpg"]);
    }

    #[tokio::test]
    async fn missing_timestamps_sort_first_and_total() {
        let gateway = MemoryGateway::new();
        gateway.put("photo-stream/ABCD-EFGH/z.jpg", None, 1);
        gateway.put("photo-stream/ABCD-EFGH/m.jpg", at(50), 1);
        gateway.put("photo-stream/ABCD-EFGH/a.jpg", None, 1);
        let (service, _rooms) = service_with(gateway);

        let photos = service.list_photos(STREAM).await.unwrap();

        let filenames: Vec<&str> = photos.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(filenames, ["a.jpg", "z.jpg", "m.jpg"]);
    }

    #[tokio::test]
    async fn listing_excludes_the_prefix_placeholder() {
        let gateway = MemoryGateway::new();
        gateway.put("photo-stream/ABCD-EFGH/", at(10), 0);
        gateway.put("photo-stream/ABCD-EFGH/1.jpg", at(20), 5);
        let (service, _rooms) = service_with(gateway);

        let photos = service.list_photos(STREAM).await.unwrap();

        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].filename, "1.jpg");
    }

    #[tokio::test]
    async fn completion_broadcasts_with_derived_filename() {
        let (service, rooms) = service_with(MemoryGateway::new());
        let (tx, mut rx) = unbounded_channel();
        rooms.join(Uuid::new_v4(), STREAM, tx).await;
        let _ack = rx.recv().await;

        service
            .complete_upload(STREAM, "photo-stream/ABCD-EFGH/123-abc.jpg", None)
            .await
            .unwrap();

        let event = match rx.recv().await.unwrap() {
            axum::extract::ws::Message::Text(text) => {
                serde_json::from_str::<ServerEvent>(&text).unwrap()
            }
            other => panic!("unexpected message {:?}", other),
        };
        match event {
            ServerEvent::PhotoAdded {
                stream_id,
                key,
                filename,
                ..
            } => {
                assert_eq!(stream_id, STREAM);
                assert_eq!(key, "photo-stream/ABCD-EFGH/123-abc.jpg");
                assert_eq!(filename, "123-abc.jpg");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn completion_prefers_the_explicit_filename() {
        let (service, rooms) = service_with(MemoryGateway::new());
        let (tx, mut rx) = unbounded_channel();
        rooms.join(Uuid::new_v4(), STREAM, tx).await;
        let _ack = rx.recv().await;

        service
            .complete_upload(
                STREAM,
                "photo-stream/ABCD-EFGH/123-abc.jpg",
                Some("sunset.jpg".into()),
            )
            .await
            .unwrap();

        let event = match rx.recv().await.unwrap() {
            axum::extract::ws::Message::Text(text) => {
                serde_json::from_str::<ServerEvent>(&text).unwrap()
            }
            other => panic!("unexpected message {:?}", other),
        };
        match event {
            ServerEvent::PhotoAdded { filename, .. } => assert_eq!(filename, "sunset.jpg"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn completion_requires_a_key_but_not_listeners() {
        let (service, _rooms) = service_with(MemoryGateway::new());

        assert!(matches!(
            service.complete_upload(STREAM, "", None).await,
            Err(ApiError::MissingKey)
        ));
        // Fire-and-forget: an empty room still acknowledges.
        service
            .complete_upload(STREAM, "photo-stream/ABCD-EFGH/1.jpg", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn clearing_an_empty_stream_is_an_idempotent_no_op() {
        let (service, _rooms) = service_with(MemoryGateway::new());

        assert_eq!(service.clear_stream(STREAM).await.unwrap(), 0);
        assert_eq!(service.clear_stream(STREAM).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn clearing_deletes_everything_and_announces_it() {
        let gateway = MemoryGateway::new();
        gateway.put("photo-stream/ABCD-EFGH/1.jpg", at(1), 1);
        gateway.put("photo-stream/ABCD-EFGH/2.jpg", at(2), 1);
        gateway.put("photo-stream/WXYZ-WXYZ/other.jpg", at(3), 1);
        let (service, rooms) = service_with(gateway.clone());
        let (tx, mut rx) = unbounded_channel();
        rooms.join(Uuid::new_v4(), STREAM, tx).await;
        let _ack = rx.recv().await;

        assert_eq!(service.clear_stream(STREAM).await.unwrap(), 2);

        // Unrelated prefixes are untouched.
        assert_eq!(
            gateway.keys(),
            vec!["photo-stream/WXYZ-WXYZ/other.jpg".to_string()]
        );
        let event = match rx.recv().await.unwrap() {
            axum::extract::ws::Message::Text(text) => {
                serde_json::from_str::<ServerEvent>(&text).unwrap()
            }
            other => panic!("unexpected message {:?}", other),
        };
        assert!(matches!(event, ServerEvent::StreamCleared { .. }));
    }
}
