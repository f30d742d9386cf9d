//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{FrameError, RoomId};

/// Room 参加の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("room {room} is full ({current_users} users)")]
    RoomFull { room: RoomId, current_users: usize },

    #[error("connection is already closed")]
    ConnectionClosed,
}

/// ファイル中継の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("sender is not in a room")]
    NotInRoom,

    #[error("invalid chunk frame: {0}")]
    InvalidFrame(#[from] FrameError),
}
