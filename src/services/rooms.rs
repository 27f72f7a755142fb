//! Room broadcaster: maps stream identifiers to the websocket sessions
//! currently watching them and fans events out to every member.

use crate::models::{events::ServerEvent, stream::StreamId};
use axum::extract::ws::Message;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc::UnboundedSender, RwLock};
use uuid::Uuid;

pub type SessionId = Uuid;

#[derive(Clone, Default)]
pub struct RoomBroadcaster {
    rooms: Arc<RwLock<HashMap<String, HashMap<SessionId, UnboundedSender<Message>>>>>,
}

impl RoomBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `session` to the room named by `candidate` and acknowledge it with
    /// a `joinedStream` event.
    ///
    /// Malformed identifiers are dropped without surfacing an error to the
    /// caller; the session simply never receives an acknowledgement.
    pub async fn join(
        &self,
        session: SessionId,
        candidate: &str,
        sender: UnboundedSender<Message>,
    ) {
        let Ok(stream) = StreamId::parse(candidate) else {
            tracing::debug!("ignoring join with malformed stream id {:?}", candidate);
            return;
        };

        {
            let mut rooms = self.rooms.write().await;
            rooms
                .entry(stream.to_string())
                .or_default()
                .insert(session, sender.clone());
        }
        tracing::debug!("session {} joined stream {}", session, stream);

        let ack = ServerEvent::JoinedStream {
            stream_id: stream.to_string(),
        };
        if let Ok(payload) = serde_json::to_string(&ack) {
            let _ = sender.send(Message::Text(payload.into()));
        }
    }

    /// Deliver `event` to every session currently in the stream's room.
    ///
    /// Fire-and-forget: sessions whose channel has closed are pruned, nothing
    /// is queued or retried for anyone else.
    pub async fn publish(&self, stream: &StreamId, event: &ServerEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("failed to serialize room event: {}", err);
                return;
            }
        };

        let mut rooms = self.rooms.write().await;
        if let Some(members) = rooms.get_mut(stream.as_str()) {
            members.retain(|_, sender| sender.send(Message::Text(payload.clone().into())).is_ok());
        }
    }

    /// Remove the session from every room it joined. Idempotent.
    pub async fn disconnect(&self, session: SessionId) {
        let mut rooms = self.rooms.write().await;
        for members in rooms.values_mut() {
            members.remove(&session);
        }
        rooms.retain(|_, members| !members.is_empty());
    }

    /// Number of sessions currently in a stream's room.
    pub async fn member_count(&self, stream: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(stream)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}
