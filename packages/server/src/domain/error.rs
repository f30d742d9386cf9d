//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクト生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("room id is too long ({length} > {max} characters)")]
    RoomIdTooLong { length: usize, max: usize },

    #[error("username is too long ({length} > {max} characters)")]
    UsernameTooLong { length: usize, max: usize },
}

/// バイナリチャンクフレームの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame is shorter than the {header} byte chunk header ({length} bytes)")]
    TooShort { length: usize, header: usize },

    #[error("frame exceeds the {max} byte limit ({length} bytes)")]
    TooLarge { length: usize, max: usize },
}

/// Outbound Pipeline へのエンキュー失敗
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// 接続はすでにクローズ済み（キューは再利用されない）
    #[error("connection is closed")]
    Closed,

    /// キューが満杯のため接続をクローズした
    #[error("outbound queue is full, connection closed")]
    Overflow,
}
