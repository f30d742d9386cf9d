//! UseCase: Room 参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - presence プロトコル（user-joined → room-users → room-joined）の送信先と内容
//!
//! ### なぜこのテストが必要か
//! - 既存参加者・新規参加者それぞれに正しい通知が届くことを保証する
//! - 満員時は本人に room-full が届き、新しい Room には何も通知されないことを確認する
//!
//! ### どのような状況を想定しているか
//! - 正常系：空の Room への参加、既存参加者がいる Room への参加
//! - 正常系：別の Room からの移動（元の Room への退出通知）
//! - 異常系：満員の Room への参加、満員の Room への移動（元の Room からは退出済み）
//! - 異常系：クローズ済みの接続からの参加

use std::sync::Arc;

use crate::domain::{
    Admission, Connection, JoinOutcome, MessagePusher, RoomId, RoomRepository, ServerEvent,
    Username,
};

use super::{error::JoinRoomError, presence::announce_departure};

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（Room レジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Room 参加を実行
    ///
    /// 参加状態の変更はレジストリのクリティカルセクション内で完了し、
    /// 通知はその後にロックの外で送る。
    ///
    /// # Returns
    ///
    /// * `Ok(Admission)` - 参加成功（参加時点のスナップショット）
    /// * `Err(JoinRoomError::RoomFull)` - 満員（本人に room-full を送信済み）
    pub async fn execute(
        &self,
        connection: &Arc<Connection>,
        room_id: RoomId,
        username: Username,
    ) -> Result<Admission, JoinRoomError> {
        tracing::info!(
            "User '{}' joining room {} (connection {})",
            username,
            room_id,
            connection.id()
        );

        let admission = match self
            .repository
            .join(room_id, username, connection.clone())
            .await
        {
            JoinOutcome::Joined(admission) => admission,
            JoinOutcome::Full {
                room,
                current_users,
                previous,
            } => {
                // 移動元の Room からは退出済みなので、残った参加者に通知する
                announce_departure(self.message_pusher.as_ref(), &previous).await;

                let rejection = ServerEvent::room_full(room.clone(), current_users);
                if let Err(e) = self.message_pusher.push_to(connection, rejection) {
                    tracing::warn!("Failed to send room-full to {}: {}", connection.id(), e);
                }
                return Err(JoinRoomError::RoomFull {
                    room,
                    current_users,
                });
            }
            JoinOutcome::Closed => return Err(JoinRoomError::ConnectionClosed),
        };

        // 1. 移動元の Room への退出通知
        announce_departure(self.message_pusher.as_ref(), &admission.previous).await;

        // 2. 既存参加者への user-joined（既存参加者がいなければ省略）
        if admission.prior_members > 0 {
            tracing::info!(
                "Broadcasting user-joined for '{}' to existing users: {:?}",
                admission.username,
                admission.existing_users
            );
            self.message_pusher
                .broadcast(
                    &admission.room,
                    ServerEvent::UserJoined {
                        username: admission.username.clone(),
                        room: admission.room.clone(),
                    },
                    Some(connection.id()),
                )
                .await;
        }

        // 3. 本人を含む全参加者への room-users
        self.message_pusher
            .broadcast(
                &admission.room,
                ServerEvent::RoomUsers {
                    room: admission.room.clone(),
                    users: admission.users.clone(),
                },
                None,
            )
            .await;

        // 4. 本人への room-joined
        let welcome = ServerEvent::room_joined(
            admission.room.clone(),
            admission.users.clone(),
            admission.existing_users.clone(),
        );
        if let Err(e) = self.message_pusher.push_to(connection, welcome) {
            tracing::warn!("Failed to send room-joined to {}: {}", connection.id(), e);
        }

        Ok(admission)
    }
}
