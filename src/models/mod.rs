//! Core data models: stream identifiers, photo metadata, and the push events
//! exchanged over the viewer websocket.

pub mod events;
pub mod photo;
pub mod stream;
