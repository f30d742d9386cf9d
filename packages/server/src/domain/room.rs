//! Room エンティティ
//!
//! 名前付きの接続集合。最大 [`ROOM_CAPACITY`] 人まで参加できます。
//! 空の Room はレジストリに存在しない（最初の参加で生成し、最後の退出で削除する）。

use std::sync::Arc;

use super::{Connection, ConnectionId, RoomId, Username};

/// Room の最大参加人数
pub const ROOM_CAPACITY: usize = 5;

pub struct Room {
    pub id: RoomId,
    members: Vec<Arc<Connection>>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::with_capacity(ROOM_CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.members.iter().any(|m| m.id() == connection_id)
    }

    /// 指定した接続を除いた参加人数
    pub fn occupancy_excluding(&self, connection_id: ConnectionId) -> usize {
        self.members
            .iter()
            .filter(|m| m.id() != connection_id)
            .count()
    }

    /// 参加者を追加する（同じ接続がすでにいれば差し替える）
    pub fn insert(&mut self, connection: Arc<Connection>) {
        match self.members.iter_mut().find(|m| m.id() == connection.id()) {
            Some(existing) => *existing = connection,
            None => self.members.push(connection),
        }
    }

    /// 参加者を削除し、削除できたかを返す
    pub fn remove(&mut self, connection_id: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id() != connection_id);
        self.members.len() != before
    }

    pub fn members(&self) -> &[Arc<Connection>] {
        &self.members
    }

    /// 空でない表示名の一覧（参加順）
    pub fn usernames(&self) -> Vec<Username> {
        self.usernames_where(|_| true)
    }

    pub fn usernames_excluding(&self, connection_id: ConnectionId) -> Vec<Username> {
        self.usernames_where(|m| m.id() != connection_id)
    }

    fn usernames_where(&self, predicate: impl Fn(&Connection) -> bool) -> Vec<Username> {
        self.members
            .iter()
            .filter(|m| predicate(m))
            .map(|m| m.username())
            .filter(|name| !name.is_empty())
            .collect()
    }
}
