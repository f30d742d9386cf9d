//! 値オブジェクト
//!
//! ルーム ID・表示名・接続 ID・タイムスタンプを型で区別します。

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::ValueObjectError;

/// ルーム ID の最大文字数
pub const MAX_ROOM_ID_LENGTH: usize = 64;

/// 表示名の最大文字数
pub const MAX_USERNAME_LENGTH: usize = 64;

/// ルーム ID（クライアントが指定する任意の文字列、空文字は不可）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }
        let length = value.chars().count();
        if length > MAX_ROOM_ID_LENGTH {
            return Err(ValueObjectError::RoomIdTooLong {
                length,
                max: MAX_ROOM_ID_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 表示名
///
/// 空文字を許容します。空の表示名はユーザー一覧に含めません。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let length = value.chars().count();
        if length > MAX_USERNAME_LENGTH {
            return Err(ValueObjectError::UsernameTooLong {
                length,
                max: MAX_USERNAME_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続 ID（ソケットごとにサーバーが採番する）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
