//! UseCase: ファイル中継
//!
//! `file-meta` / `file-chunk` / `file-status` とバイナリチャンクフレームを、
//! 送信元の Room の他の参加者へ転送します。内容の解釈や再構成は行いません。

use std::sync::Arc;

use axum::body::Bytes;
use serde_json::Value;

use crate::domain::{ChunkFrame, Connection, MessagePusher, RoomId, ServerEvent};

use super::error::RelayError;

/// ファイル中継のユースケース
pub struct RelayFileUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayFileUseCase {
    /// 新しい RelayFileUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// ファイルのメタデータを中継し、エンキューできた数を返す
    pub async fn relay_meta(
        &self,
        sender: &Connection,
        metadata: Value,
    ) -> Result<usize, RelayError> {
        let room = current_room(sender)?;
        let event = ServerEvent::FileMeta {
            data: metadata,
            sender_name: sender.username(),
        };
        Ok(self.relay(sender, &room, event).await)
    }

    /// JSON でエンコードされたチャンクを中継する
    pub async fn relay_chunk(
        &self,
        sender: &Connection,
        chunk: Value,
    ) -> Result<usize, RelayError> {
        let room = current_room(sender)?;
        let event = ServerEvent::FileChunk {
            data: chunk,
            sender_name: sender.username(),
        };
        Ok(self.relay(sender, &room, event).await)
    }

    /// 進捗を中継する
    pub async fn relay_status(
        &self,
        sender: &Connection,
        progress: i64,
    ) -> Result<usize, RelayError> {
        let room = current_room(sender)?;
        let event = ServerEvent::FileStatus {
            data: progress,
            sender_name: sender.username(),
        };
        Ok(self.relay(sender, &room, event).await)
    }

    /// バイナリチャンクフレームを検証し、バイト列をそのまま中継する
    ///
    /// チャンクの順序や欠落は検証しない（受信側の責務）。
    pub async fn relay_binary(
        &self,
        sender: &Connection,
        frame: Bytes,
    ) -> Result<usize, RelayError> {
        let room = {
            let chunk = ChunkFrame::parse(&frame)?;
            let room = current_room(sender)?;
            tracing::debug!(
                "Chunk {} of file '{}' ({} bytes, last: {}) from {}",
                chunk.header.chunk_index,
                chunk.header.file_id,
                chunk.payload.len(),
                chunk.header.is_last,
                sender.id()
            );
            room
        };

        Ok(self
            .message_pusher
            .broadcast_binary(&room, frame, Some(sender.id()))
            .await)
    }

    async fn relay(&self, sender: &Connection, room: &RoomId, event: ServerEvent) -> usize {
        self.message_pusher
            .broadcast(room, event, Some(sender.id()))
            .await
    }
}

fn current_room(sender: &Connection) -> Result<RoomId, RelayError> {
    sender.room().ok_or(RelayError::NotInRoom)
}
