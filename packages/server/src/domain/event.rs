//! Events the relay sends to clients.
//!
//! Every variant serializes to a flat JSON object whose `event` field carries
//! the kebab-case variant name, e.g. `{"event":"room-users","room":"abc","users":[...]}`.

use serde::Serialize;
use serde_json::Value;

use super::{ROOM_CAPACITY, RoomId, Username};

pub const ROOM_FULL_MESSAGE: &str = "Room is full. Maximum 5 users allowed.";
pub const ROOM_JOINED_MESSAGE: &str = "Successfully joined room";
pub const TEST_SUCCESS_MESSAGE: &str = "Connection test successful";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    RoomFull {
        room: RoomId,
        message: String,
        current_users: usize,
        max_users: usize,
    },
    UserJoined {
        username: Username,
        room: RoomId,
    },
    RoomUsers {
        room: RoomId,
        users: Vec<Username>,
    },
    RoomJoined {
        room: RoomId,
        message: String,
        users: Vec<Username>,
        #[serde(rename = "existingUsers")]
        existing_users: Vec<Username>,
    },
    UserLeft {
        username: Username,
        room: RoomId,
    },
    RoomLeft {
        room: RoomId,
    },
    TestSuccess {
        message: String,
    },
    FileMeta {
        data: Value,
        #[serde(rename = "senderName")]
        sender_name: Username,
    },
    FileChunk {
        data: Value,
        #[serde(rename = "senderName")]
        sender_name: Username,
    },
    FileStatus {
        data: i64,
        #[serde(rename = "senderName")]
        sender_name: Username,
    },
}

impl ServerEvent {
    pub fn room_full(room: RoomId, current_users: usize) -> Self {
        Self::RoomFull {
            room,
            message: ROOM_FULL_MESSAGE.to_string(),
            current_users,
            max_users: ROOM_CAPACITY,
        }
    }

    pub fn room_joined(room: RoomId, users: Vec<Username>, existing_users: Vec<Username>) -> Self {
        Self::RoomJoined {
            room,
            message: ROOM_JOINED_MESSAGE.to_string(),
            users,
            existing_users,
        }
    }

    pub fn test_success() -> Self {
        Self::TestSuccess {
            message: TEST_SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Wire name of the event, as found in the `event` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomFull { .. } => "room-full",
            Self::UserJoined { .. } => "user-joined",
            Self::RoomUsers { .. } => "room-users",
            Self::RoomJoined { .. } => "room-joined",
            Self::UserLeft { .. } => "user-left",
            Self::RoomLeft { .. } => "room-left",
            Self::TestSuccess { .. } => "test-success",
            Self::FileMeta { .. } => "file-meta",
            Self::FileChunk { .. } => "file-chunk",
            Self::FileStatus { .. } => "file-status",
        }
    }
}
