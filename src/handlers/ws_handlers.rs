//! Websocket push transport: one session per connected viewer.
//!
//! The session sends `joinStream` to register interest; the server answers
//! with `joinedStream` and then pushes `photoAdded` / `streamCleared` events
//! for every room the session joined, until it disconnects.

use crate::{models::events::ClientEvent, state::AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

/// GET `/ws` — upgrade the connection and run the session loop.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

async fn handle_session(socket: WebSocket, state: AppState) {
    let session = Uuid::new_v4();
    let (mut outbound, mut inbound) = socket.split();

    // Room events flow through a channel so the broadcaster never blocks on a
    // slow socket.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let pump = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if outbound.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = inbound.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::JoinStream { stream_id }) => {
                    state.rooms.join(session, &stream_id, tx.clone()).await;
                }
                Err(err) => {
                    tracing::debug!("session {}: unrecognized message: {}", session, err);
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.rooms.disconnect(session).await;
    pump.abort();
    tracing::debug!("session {} disconnected", session);
}
