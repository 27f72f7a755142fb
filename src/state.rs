use crate::services::{rooms::RoomBroadcaster, stream_service::StreamService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub streams: StreamService,
    pub rooms: RoomBroadcaster,
}
