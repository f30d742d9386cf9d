//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `RwLock<HashMap<RoomId, Room>>` をレジストリとして使用します。
//!
//! ## ロック方針
//!
//! - join / leave は書き込みロックを取り、移動元からの退出・参加人数の判定・追加・
//!   ユーザー一覧の計算を一つのクリティカルセクションで行う（同じ新規 Room への同時参加で
//!   定員を超えない）
//! - members は読み込みロックで参加者の一覧を複製して返す
//! - 接続ごとのロック（presence / pipeline）は常にレジストリのロックの内側で取る
//!
//! ## クローズ済みの接続
//!
//! 接続の切断処理はクローズしてから leave を呼ぶ。join は書き込みロックの中で
//! クローズ済みかを確認するため、leave より後に到着した join が接続を登録し直すことはない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    Admission, Connection, Departure, JoinOutcome, LeaveOutcome, ROOM_CAPACITY, Room, RoomId,
    RoomRepository, Username,
};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    /// Room ID → Room
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// `room_id` から接続を取り除く。空になった Room は削除する。
    fn detach(
        rooms: &mut HashMap<RoomId, Room>,
        room_id: &RoomId,
        connection: &Connection,
    ) -> LeaveOutcome {
        let Some(room) = rooms.get_mut(room_id) else {
            return LeaveOutcome::NotInRoom;
        };
        if !room.remove(connection.id()) {
            return LeaveOutcome::NotInRoom;
        }

        if room.is_empty() {
            rooms.remove(room_id);
            tracing::info!("Room {} deleted - no users remaining", room_id);
            return LeaveOutcome::Emptied {
                room: room_id.clone(),
            };
        }

        let remaining_users = room.usernames();
        tracing::info!(
            "User '{}' left room {}. Remaining users: {:?}",
            connection.username(),
            room_id,
            remaining_users
        );
        LeaveOutcome::Left(Departure {
            room: room_id.clone(),
            username: connection.username(),
            remaining_users,
        })
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(
        &self,
        room_id: RoomId,
        username: Username,
        connection: Arc<Connection>,
    ) -> JoinOutcome {
        let mut rooms = self.rooms.write().await;

        if !connection.is_open() {
            tracing::debug!(
                "Ignoring join to room {} from closed connection {}",
                room_id,
                connection.id()
            );
            return JoinOutcome::Closed;
        }

        // 移動元の Room からの退出は定員の判定より先に行う（拒否されても戻さない）
        let previous = match connection.room() {
            Some(current) if current != room_id => {
                connection.clear_room();
                Self::detach(&mut rooms, &current, &connection)
            }
            _ => LeaveOutcome::NotInRoom,
        };

        let occupancy = rooms
            .get(&room_id)
            .map_or(0, |room| room.occupancy_excluding(connection.id()));
        if occupancy >= ROOM_CAPACITY {
            tracing::warn!(
                "Room {} is full ({}/{} users). Rejecting user '{}'",
                room_id,
                occupancy,
                ROOM_CAPACITY,
                username
            );
            return JoinOutcome::Full {
                room: room_id,
                current_users: occupancy,
                previous,
            };
        }

        let room = rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone()));

        let existing_users = room.usernames_excluding(connection.id());
        let prior_members = room.occupancy_excluding(connection.id());

        connection.assign(room_id.clone(), username.clone());
        room.insert(connection);
        let users = room.usernames();

        tracing::info!("Room {} now has users: {:?}", room_id, users);

        JoinOutcome::Joined(Admission {
            room: room_id,
            username,
            users,
            existing_users,
            prior_members,
            previous,
        })
    }

    async fn leave(&self, connection: &Connection) -> LeaveOutcome {
        let mut rooms = self.rooms.write().await;
        match connection.clear_room() {
            Some(room_id) => Self::detach(&mut rooms, &room_id, connection),
            None => LeaveOutcome::NotInRoom,
        }
    }

    async fn members(&self, room_id: &RoomId) -> Option<Vec<Arc<Connection>>> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map(|room| room.members().to_vec())
    }
}
