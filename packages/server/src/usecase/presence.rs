//! 退出時の presence 通知

use crate::domain::{LeaveOutcome, MessagePusher, ServerEvent};

/// 退出後に残った参加者へ `user-left` と `room-users` を送る。
///
/// Room が空になった場合や未参加だった場合は何も送らない。
/// 表示名のない接続の退出では `user-left` を省略する。
pub(super) async fn announce_departure(message_pusher: &dyn MessagePusher, outcome: &LeaveOutcome) {
    let LeaveOutcome::Left(departure) = outcome else {
        return;
    };

    if !departure.username.is_empty() {
        message_pusher
            .broadcast(
                &departure.room,
                ServerEvent::UserLeft {
                    username: departure.username.clone(),
                    room: departure.room.clone(),
                },
                None,
            )
            .await;
    }

    message_pusher
        .broadcast(
            &departure.room,
            ServerEvent::RoomUsers {
                room: departure.room.clone(),
                users: departure.remaining_users.clone(),
            },
            None,
        )
        .await;

    tracing::info!(
        "Broadcast completed for user '{}' leaving room {}",
        departure.username,
        departure.room
    );
}
