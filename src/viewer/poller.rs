//! Polling loop: a fixed tick plus early wake-ups from push events.

use super::reconciler::{Reconciliation, ViewerState};
use crate::models::{
    events::ServerEvent,
    photo::{PhotoListing, PhotoObject},
    stream::StreamId,
};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// How often the viewer reconciles even when no push event arrives.
pub const POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum PollError {
    #[error("poll request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("poll transport failed: {0}")]
    Transport(String),
}

/// Where the viewer fetches the current photo set from.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn fetch(&self, stream: &StreamId) -> Result<Vec<PhotoObject>, PollError>;
}

/// Production source: the server's listing endpoint.
pub struct HttpPhotoSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPhotoSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PhotoSource for HttpPhotoSource {
    async fn fetch(&self, stream: &StreamId) -> Result<Vec<PhotoObject>, PollError> {
        let url = format!(
            "{}/api/photos/{}",
            self.base_url.trim_end_matches('/'),
            stream
        );
        let listing: PhotoListing = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(listing.photos)
    }
}

/// One poll, folded into the viewer state. Failures degrade the display and
/// are retried on the next scheduled tick; they never end the loop.
pub async fn poll_once(source: &dyn PhotoSource, stream: &StreamId, state: &mut ViewerState) {
    match source.fetch(stream).await {
        Ok(photos) => match state.apply_listing(photos) {
            Reconciliation::Unchanged => {}
            Reconciliation::Advanced => tracing::info!(
                "stream {}: {} photos, showing {}",
                stream,
                state.photos.len(),
                state
                    .active_photo()
                    .map(|p| p.filename.as_str())
                    .unwrap_or("-"),
            ),
            Reconciliation::Rebuilt => tracing::info!(
                "stream {}: photo set rebuilt, {} photos",
                stream,
                state.photos.len()
            ),
        },
        Err(err) => {
            tracing::warn!("stream {}: poll failed, keeping current photos: {}", stream, err);
            state.apply_error(err.to_string());
        }
    }
}

/// Drive the reconciliation loop forever.
///
/// `photoAdded` and `streamCleared` pushes schedule an extra poll without
/// resetting the interval timer, which keeps its own cadence and remains the
/// guaranteed path when pushes are missed. Overlapping polls are not mutually
/// excluded; the later response governs the displayed state.
pub async fn run(
    source: &dyn PhotoSource,
    stream: &StreamId,
    state: &mut ViewerState,
    mut push: UnboundedReceiver<ServerEvent>,
) {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut push_open = true;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            event = push.recv(), if push_open => match event {
                Some(ServerEvent::PhotoAdded { .. } | ServerEvent::StreamCleared { .. }) => {}
                Some(ServerEvent::JoinedStream { .. }) => continue,
                None => {
                    // Push channel gone; the timer alone carries the loop.
                    push_open = false;
                    continue;
                }
            },
        }
        poll_once(source, stream, state).await;
    }
}
