//! MessagePusher trait 定義
//!
//! Broadcast Engine へのインターフェース。メッセージを各接続の Outbound Pipeline に
//! 積むだけで、配送の完了は待ちません。

use async_trait::async_trait;
use axum::body::Bytes;

use super::{Connection, ConnectionId, EnqueueError, RoomId, ServerEvent};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 特定の接続にイベントを送る
    fn push_to(&self, connection: &Connection, event: ServerEvent) -> Result<(), EnqueueError>;

    /// Room の参加者（`exclude` を除く）にイベントを送り、エンキューできた数を返す
    async fn broadcast(
        &self,
        room_id: &RoomId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> usize;

    /// Room の参加者（`exclude` を除く）にバイナリフレームをそのまま送る
    async fn broadcast_binary(
        &self,
        room_id: &RoomId,
        frame: Bytes,
        exclude: Option<ConnectionId>,
    ) -> usize;
}
