//! Server state shared by every handler.

use std::sync::Arc;

use crate::usecase::LeaveRoomUseCase;

use super::router::EventRouter;

/// Shared application state
pub struct AppState {
    /// EventRouter（受信イベントのディスパッチテーブル）
    pub event_router: Arc<EventRouter>,
    /// LeaveRoomUseCase（切断時の退出処理）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
}
