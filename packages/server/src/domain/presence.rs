//! Room レジストリの変更結果
//!
//! join / leave はクリティカルセクション内で参加者のスナップショットまで計算し、
//! その結果をこれらの型で返します。通知の送信はロックの外で行います。

use super::{RoomId, Username};

/// join の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// 参加できた
    Joined(Admission),
    /// 満員のため拒否された
    ///
    /// 別の Room から移動しようとしていた場合、その Room からはすでに退出している。
    Full {
        room: RoomId,
        current_users: usize,
        previous: LeaveOutcome,
    },
    /// 接続がすでにクローズされている（参加状態は変更されていない）
    Closed,
}

/// 参加成功時のスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub room: RoomId,
    pub username: Username,
    /// 参加後の全参加者の表示名
    pub users: Vec<Username>,
    /// 参加前からいた参加者の表示名
    pub existing_users: Vec<Username>,
    /// 参加前からいた参加者の人数（表示名が空の参加者も含む）
    pub prior_members: usize,
    /// 別の Room から移動した場合、その Room からの退出結果
    pub previous: LeaveOutcome,
}

/// leave の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// どの Room にも参加していなかった
    NotInRoom,
    /// 最後の参加者が退出し、Room を削除した
    Emptied { room: RoomId },
    /// 退出後も参加者が残っている
    Left(Departure),
}

impl LeaveOutcome {
    /// 退出した Room の ID
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            Self::NotInRoom => None,
            Self::Emptied { room } => Some(room),
            Self::Left(departure) => Some(&departure.room),
        }
    }
}

/// 退出後に残った参加者へ通知するための情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room: RoomId,
    pub username: Username,
    pub remaining_users: Vec<Username>,
}
