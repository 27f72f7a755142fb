//! Push-transport events.
//!
//! The wire format is a flat JSON object tagged by `type`, camelCase fields:
//!
//! ```json
//! { "type": "photoAdded", "streamId": "ABCD-EFGH", "key": "...", "filename": "...", "at": 1700000000000 }
//! ```

use serde::{Deserialize, Serialize};

/// Events a connected session may send to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Register interest in a stream's room.
    #[serde(rename = "joinStream", rename_all = "camelCase")]
    JoinStream { stream_id: String },
}

/// Events the server publishes to room members. Delivery is fire-and-forget:
/// no confirmation, no retry, no replay for sessions that were absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Acknowledges a successful join, sent to the joining session only.
    #[serde(rename = "joinedStream", rename_all = "camelCase")]
    JoinedStream { stream_id: String },

    /// An uploader reported a finished PUT. `at` is epoch milliseconds.
    #[serde(rename = "photoAdded", rename_all = "camelCase")]
    PhotoAdded {
        stream_id: String,
        key: String,
        filename: String,
        at: i64,
    },

    /// The stream's objects were bulk-deleted.
    #[serde(rename = "streamCleared", rename_all = "camelCase")]
    StreamCleared { stream_id: String, at: i64 },
}
