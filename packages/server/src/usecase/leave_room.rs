//! UseCase: Room 退出処理
//!
//! 明示的な `leave-room` と、ソケット切断時の退出の両方を扱います。
//! どちらも残った参加者に `user-left` と `room-users` を送り、明示的な退出では
//! 本人に `room-left` を返します。

use std::sync::Arc;

use crate::domain::{Connection, LeaveOutcome, MessagePusher, RoomRepository, ServerEvent};

use super::presence::announce_departure;

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（Room レジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// クライアントの `leave-room` による退出（接続は維持する）
    pub async fn execute(&self, connection: &Connection) -> LeaveOutcome {
        let outcome = self.leave(connection).await;

        if let Some(room) = outcome.room() {
            let ack = ServerEvent::RoomLeft { room: room.clone() };
            if let Err(e) = self.message_pusher.push_to(connection, ack) {
                tracing::debug!("Failed to send room-left to {}: {}", connection.id(), e);
            }
        }

        outcome
    }

    /// ソケット切断に伴う退出（本人には何も送らない）
    pub async fn disconnect(&self, connection: &Connection) -> LeaveOutcome {
        self.leave(connection).await
    }

    async fn leave(&self, connection: &Connection) -> LeaveOutcome {
        let outcome = self.repository.leave(connection).await;
        announce_departure(self.message_pusher.as_ref(), &outcome).await;
        outcome
    }
}
