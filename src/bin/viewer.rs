//! Passive viewer binary: joins a stream's room over the websocket, then runs
//! the reconciliation loop against the listing endpoint. The push channel is
//! best-effort — when it is unavailable or drops, polling alone carries the
//! viewer.

use anyhow::Result;
use clap::Parser;
use futures::{SinkExt, StreamExt};
use photo_stream::{
    models::{
        events::{ClientEvent, ServerEvent},
        stream::StreamId,
    },
    viewer::{
        poller::{self, HttpPhotoSource},
        reconciler::ViewerState,
    },
};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Photo stream viewer")]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Stream code to watch; a fresh one is generated when omitted
    #[arg(long)]
    stream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let stream = match &args.stream {
        Some(code) => StreamId::parse(code)?,
        None => StreamId::generate(),
    };
    tracing::info!("watching stream {} via {}", stream, args.server);

    let (push_tx, push_rx) = mpsc::unbounded_channel();
    let ws_url = ws_url(&args.server);
    let join = ClientEvent::JoinStream {
        stream_id: stream.to_string(),
    };

    tokio::spawn(async move {
        let (mut socket, _) = match connect_async(ws_url.as_str()).await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!("push channel unavailable, polling only: {}", err);
                return;
            }
        };
        let Ok(payload) = serde_json::to_string(&join) else {
            return;
        };
        if socket.send(Message::Text(payload.into())).await.is_err() {
            return;
        }
        while let Some(Ok(msg)) = socket.next().await {
            if let Message::Text(text) = msg {
                match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => {
                        if push_tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(err) => tracing::debug!("ignoring push payload: {}", err),
                }
            }
        }
        tracing::warn!("push channel closed, polling only");
    });

    let source = HttpPhotoSource::new(args.server.clone());
    let mut state = ViewerState::new();
    poller::run(&source, &stream, &mut state, push_rx).await;

    Ok(())
}

/// Derive the websocket endpoint from the server base URL.
fn ws_url(server: &str) -> String {
    let base = server.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}/ws", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}/ws", rest)
    } else {
        format!("ws://{}/ws", base)
    }
}
