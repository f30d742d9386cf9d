//! Repository trait 定義
//!
//! Room レジストリ（Room ID → 参加接続の集合）へのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{Connection, JoinOutcome, LeaveOutcome, RoomId, Username};

/// Room Repository trait
///
/// 参加状態の唯一の情報源。参加人数の判定と追加は一つのクリティカルセクションで行うこと。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 接続を Room に参加させる
    ///
    /// 別の Room にいれば、定員の判定より先にその Room から退出させる。
    /// クローズ済みの接続は参加させない。
    async fn join(
        &self,
        room_id: RoomId,
        username: Username,
        connection: Arc<Connection>,
    ) -> JoinOutcome;

    /// 接続を現在の Room から退出させる（未参加なら何もしない）
    async fn leave(&self, connection: &Connection) -> LeaveOutcome;

    /// Room の参加者のスナップショットを取得（Room がなければ None）
    async fn members(&self, room_id: &RoomId) -> Option<Vec<Arc<Connection>>>;
}
