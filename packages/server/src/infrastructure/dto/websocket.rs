//! Inbound WebSocket message DTOs.
//!
//! Text frames carry `{"event": <string>, "data": <any>}`. The payload shape
//! depends on the event; `metadata` and `chunk` are passed through untouched.

use serde::Deserialize;
use serde_json::Value;

/// Envelope of every inbound text frame
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// `join-room` payload
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomPayload {
    #[serde(rename = "roomId")]
    pub room_id: String,
    #[serde(default)]
    pub username: String,
}

/// `file-meta` payload
#[derive(Debug, Clone, Deserialize)]
pub struct FileMetaPayload {
    #[serde(default)]
    pub metadata: Value,
}

/// `file-chunk` payload (JSON-encoded variant)
#[derive(Debug, Clone, Deserialize)]
pub struct FileChunkPayload {
    #[serde(default)]
    pub chunk: Value,
}

/// `file-status` payload
#[derive(Debug, Clone, Deserialize)]
pub struct FileStatusPayload {
    pub progress: i64,
}
