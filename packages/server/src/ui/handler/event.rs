//! Handlers for inbound text events.
//!
//! Each handler decodes its own payload from the envelope's `data` field and
//! calls one use case. Handlers never fail the connection; errors are
//! returned to the router, which logs and drops them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::{
    domain::{Connection, EnqueueError, RoomId, Username, ValueObjectError},
    infrastructure::dto::websocket::{
        FileChunkPayload, FileMetaPayload, FileStatusPayload, JoinRoomPayload,
    },
    usecase::{
        JoinRoomError, JoinRoomUseCase, LeaveRoomUseCase, RelayError, RelayFileUseCase,
        TestConnectionUseCase,
    },
};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    InvalidValue(#[from] ValueObjectError),

    #[error(transparent)]
    Join(#[from] JoinRoomError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("failed to reply: {0}")]
    Reply(#[from] EnqueueError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, connection: &Arc<Connection>, data: Value) -> Result<(), HandlerError>;
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, HandlerError> {
    Ok(serde_json::from_value(data)?)
}

pub struct JoinRoomHandler {
    pub usecase: Arc<JoinRoomUseCase>,
}

#[async_trait]
impl EventHandler for JoinRoomHandler {
    async fn handle(&self, connection: &Arc<Connection>, data: Value) -> Result<(), HandlerError> {
        let payload: JoinRoomPayload = decode(data)?;
        let room_id = RoomId::try_from(payload.room_id)?;
        let username = Username::try_from(payload.username)?;

        let admission = self.usecase.execute(connection, room_id, username).await?;
        tracing::info!(
            "User '{}' joined room {}",
            admission.username,
            admission.room
        );
        Ok(())
    }
}

/// `leave-room`; the payload's room id is ignored in favor of the current room.
pub struct LeaveRoomHandler {
    pub usecase: Arc<LeaveRoomUseCase>,
}

#[async_trait]
impl EventHandler for LeaveRoomHandler {
    async fn handle(&self, connection: &Arc<Connection>, _data: Value) -> Result<(), HandlerError> {
        let outcome = self.usecase.execute(connection).await;
        match outcome.room() {
            Some(room) => tracing::info!("Connection {} left room {}", connection.id(), room),
            None => {
                tracing::debug!(
                    "Connection {} sent leave-room outside a room",
                    connection.id()
                )
            }
        }
        Ok(())
    }
}

pub struct FileMetaHandler {
    pub usecase: Arc<RelayFileUseCase>,
}

#[async_trait]
impl EventHandler for FileMetaHandler {
    async fn handle(&self, connection: &Arc<Connection>, data: Value) -> Result<(), HandlerError> {
        let payload: FileMetaPayload = decode(data)?;
        self.usecase.relay_meta(connection, payload.metadata).await?;
        Ok(())
    }
}

pub struct FileChunkHandler {
    pub usecase: Arc<RelayFileUseCase>,
}

#[async_trait]
impl EventHandler for FileChunkHandler {
    async fn handle(&self, connection: &Arc<Connection>, data: Value) -> Result<(), HandlerError> {
        let payload: FileChunkPayload = decode(data)?;
        self.usecase.relay_chunk(connection, payload.chunk).await?;
        Ok(())
    }
}

pub struct FileStatusHandler {
    pub usecase: Arc<RelayFileUseCase>,
}

#[async_trait]
impl EventHandler for FileStatusHandler {
    async fn handle(&self, connection: &Arc<Connection>, data: Value) -> Result<(), HandlerError> {
        let payload: FileStatusPayload = decode(data)?;
        self.usecase.relay_status(connection, payload.progress).await?;
        Ok(())
    }
}

pub struct TestConnectionHandler {
    pub usecase: Arc<TestConnectionUseCase>,
}

#[async_trait]
impl EventHandler for TestConnectionHandler {
    async fn handle(&self, connection: &Arc<Connection>, _data: Value) -> Result<(), HandlerError> {
        self.usecase.execute(connection)?;
        Ok(())
    }
}
