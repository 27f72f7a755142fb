//! Thin contract over the object-storage backend.
//!
//! The core only ever needs three operations: list everything under a prefix,
//! issue a presigned PUT, and bulk-delete a set of keys. `S3Gateway` is the
//! production implementation; `MemoryGateway` is a deterministic in-process
//! stand-in used by the test suite.

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend request failed: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Raw listing entry as the backend reports it. Order is unspecified; callers
/// re-sort.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: i64,
}

#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// All objects whose key begins with `prefix`.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>>;

    /// URL usable for exactly one direct PUT of the object body within `ttl`,
    /// fixing the supplied content type and a long-lived immutable cache
    /// directive on the stored object.
    async fn presign_put(&self, key: &str, content_type: &str, ttl: Duration)
        -> StorageResult<String>;

    /// Best-effort bulk delete. Partial failure is acceptable but must never
    /// touch keys outside the supplied set.
    async fn delete_all(&self, keys: &[String]) -> StorageResult<()>;
}

/// Uploaded photos never change, so viewers may cache them forever.
const OBJECT_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// S3 caps DeleteObjects at 1000 keys per request.
const DELETE_BATCH: usize = 1000;

#[derive(Clone)]
pub struct S3Gateway {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Gateway {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl StorageGateway for S3Gateway {
    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|err| StorageError::Backend(err.to_string()))?;

            for obj in page.contents() {
                let Some(key) = obj.key() else { continue };
                objects.push(StoredObject {
                    key: key.to_string(),
                    last_modified: obj
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                    size: obj.size().unwrap_or(0),
                });
            }

            if page.is_truncated() == Some(true) {
                continuation = page.next_continuation_token().map(str::to_string);
                if continuation.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        Ok(objects)
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        let config = PresigningConfig::expires_in(ttl)
            .map_err(|err| StorageError::Backend(err.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .cache_control(OBJECT_CACHE_CONTROL)
            .presigned(config)
            .await
            .map_err(|err| StorageError::Backend(err.to_string()))?;

        Ok(request.uri().to_string())
    }

    async fn delete_all(&self, keys: &[String]) -> StorageResult<()> {
        for batch in keys.chunks(DELETE_BATCH) {
            let targets = batch
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| StorageError::Backend(err.to_string()))?;
            let delete = Delete::builder()
                .set_objects(Some(targets))
                .build()
                .map_err(|err| StorageError::Backend(err.to_string()))?;

            self.client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|err| StorageError::Backend(err.to_string()))?;
        }
        Ok(())
    }
}

/// In-process gateway over a plain map. Presigned URLs are fake
/// (`memory://...`); tests place objects directly with [`MemoryGateway::put`].
#[derive(Clone, Default)]
pub struct MemoryGateway {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object as if a client had PUT it.
    pub fn put(&self, key: &str, last_modified: Option<DateTime<Utc>>, size: i64) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                key: key.to_string(),
                last_modified,
                size,
            },
        );
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .values()
            .filter(|obj| obj.key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn presign_put(
        &self,
        key: &str,
        _content_type: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        Ok(format!("memory://{}?expires={}", key, ttl.as_secs()))
    }

    async fn delete_all(&self, keys: &[String]) -> StorageResult<()> {
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_gateway_scopes_deletes_to_the_given_keys() {
        let gateway = MemoryGateway::new();
        gateway.put("a/1.jpg", None, 10);
        gateway.put("a/2.jpg", None, 20);
        gateway.put("b/1.jpg", None, 30);

        gateway
            .delete_all(&["a/1.jpg".to_string(), "a/2.jpg".to_string()])
            .await
            .unwrap();

        assert_eq!(gateway.keys(), vec!["b/1.jpg".to_string()]);
        assert!(gateway.list("a/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn memory_gateway_lists_by_prefix() {
        let gateway = MemoryGateway::new();
        gateway.put("p/x/1.jpg", None, 1);
        gateway.put("p/y/1.jpg", None, 1);

        let listed = gateway.list("p/x/").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "p/x/1.jpg");
    }
}
