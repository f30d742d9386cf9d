//! UseCase: 接続テスト
//!
//! `test-connection` に対して送信元にだけ `test-success` を返します。

use std::sync::Arc;

use crate::domain::{Connection, EnqueueError, MessagePusher, ServerEvent};

/// 接続テストのユースケース
pub struct TestConnectionUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl TestConnectionUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    pub fn execute(&self, connection: &Connection) -> Result<(), EnqueueError> {
        self.message_pusher
            .push_to(connection, ServerEvent::test_success())
    }
}
