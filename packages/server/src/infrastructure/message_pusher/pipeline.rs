//! Outbound Pipeline を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - Room の参加者スナップショットを RoomRepository から取得
//! - 送信元（exclude）以外の参加者の Outbound Pipeline にエンキュー
//!
//! ## 設計ノート
//!
//! スナップショットは読み込みロックの中で複製し、エンキューはロックの外で行います。
//! エンキューは待たないため、遅い受信者が他の Room の変更を止めることはありません。
//! キューが溢れた受信者は Connection 側でクローズされ、その退出処理は
//! 受信者自身のタスクが行います。
//!
//! 通知の順序はベストエフォートです。同じ Room への並行した join / leave の間で、
//! スナップショットと配送の順序は原子的に揃いません。

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::domain::{
    Connection, ConnectionId, EnqueueError, MessagePusher, Outbound, RoomId, RoomRepository,
    ServerEvent,
};

/// Outbound Pipeline を使った MessagePusher 実装
pub struct PipelineMessagePusher {
    /// 参加者スナップショットの取得元
    repository: Arc<dyn RoomRepository>,
}

impl PipelineMessagePusher {
    /// 新しい PipelineMessagePusher を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// `exclude` 以外の参加者に `outbound` をエンキューし、成功数を返す
    async fn fan_out(
        &self,
        room_id: &RoomId,
        outbound: Outbound,
        exclude: Option<ConnectionId>,
    ) -> Option<usize> {
        let members = self.repository.members(room_id).await?;

        let mut sent = 0;
        for member in members.iter().filter(|m| Some(m.id()) != exclude) {
            match member.enqueue(outbound.clone()) {
                Ok(()) => sent += 1,
                // ブロードキャストでは一部の送信失敗を許容
                Err(EnqueueError::Overflow) => {
                    tracing::warn!("Dropped slow consumer {} in room {}", member.id(), room_id);
                }
                Err(EnqueueError::Closed) => {
                    tracing::debug!(
                        "Skipping closed connection {} in room {}",
                        member.id(),
                        room_id
                    );
                }
            }
        }
        tracing::debug!(
            "Total connections in room {}: {}, messages queued: {}",
            room_id,
            members.len(),
            sent
        );
        Some(sent)
    }
}

#[async_trait]
impl MessagePusher for PipelineMessagePusher {
    fn push_to(&self, connection: &Connection, event: ServerEvent) -> Result<(), EnqueueError> {
        tracing::debug!(
            "Pushing '{}' to connection {}",
            event.name(),
            connection.id()
        );
        connection.enqueue(Outbound::Event(Arc::new(event)))
    }

    async fn broadcast(
        &self,
        room_id: &RoomId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let name = event.name();
        match self
            .fan_out(room_id, Outbound::Event(Arc::new(event)), exclude)
            .await
        {
            Some(sent) => sent,
            None => {
                tracing::debug!(
                    "Room {} does not exist for broadcast of '{}'",
                    room_id,
                    name
                );
                0
            }
        }
    }

    async fn broadcast_binary(
        &self,
        room_id: &RoomId,
        frame: Bytes,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let length = frame.len();
        match self.fan_out(room_id, Outbound::Binary(frame), exclude).await {
            Some(sent) => {
                tracing::debug!(
                    "Binary broadcast to room {}: {} sent, {} bytes",
                    room_id,
                    sent,
                    length
                );
                sent
            }
            None => {
                tracing::debug!("Room {} does not exist for binary broadcast", room_id);
                0
            }
        }
    }
}
