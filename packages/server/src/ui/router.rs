//! Event Router: decodes inbound frames and dispatches them.
//!
//! The dispatch table (event name → handler) is built once at startup and
//! shared by reference with every connection.

use std::{collections::HashMap, sync::Arc};

use axum::body::Bytes;

use crate::{
    domain::{Connection, check_frame_len},
    infrastructure::dto::websocket::ClientEnvelope,
    usecase::{
        JoinRoomError, JoinRoomUseCase, LeaveRoomUseCase, RelayError, RelayFileUseCase,
        TestConnectionUseCase,
    },
};

use super::handler::event::{
    EventHandler, FileChunkHandler, FileMetaHandler, FileStatusHandler, HandlerError,
    JoinRoomHandler, LeaveRoomHandler, TestConnectionHandler,
};

/// What happened to one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A handler ran to completion
    Handled(&'static str),
    /// A handler rejected the event (logged, connection stays open)
    Failed(&'static str),
    /// No handler is registered for this event name
    UnknownEvent(String),
    /// Not a valid envelope
    Malformed,
    /// Larger than the inbound frame cap
    Oversized,
    /// Binary frame forwarded to this many peers
    Relayed(usize),
    /// Binary frame dropped (no room or truncated header)
    Dropped,
}

pub struct EventRouter {
    handlers: HashMap<&'static str, Box<dyn EventHandler>>,
    relay_file_usecase: Arc<RelayFileUseCase>,
}

impl EventRouter {
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        relay_file_usecase: Arc<RelayFileUseCase>,
        test_connection_usecase: Arc<TestConnectionUseCase>,
    ) -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn EventHandler>> = HashMap::new();
        handlers.insert(
            "join-room",
            Box::new(JoinRoomHandler {
                usecase: join_room_usecase,
            }),
        );
        handlers.insert(
            "leave-room",
            Box::new(LeaveRoomHandler {
                usecase: leave_room_usecase,
            }),
        );
        handlers.insert(
            "file-meta",
            Box::new(FileMetaHandler {
                usecase: relay_file_usecase.clone(),
            }),
        );
        handlers.insert(
            "file-chunk",
            Box::new(FileChunkHandler {
                usecase: relay_file_usecase.clone(),
            }),
        );
        handlers.insert(
            "file-status",
            Box::new(FileStatusHandler {
                usecase: relay_file_usecase.clone(),
            }),
        );
        handlers.insert(
            "test-connection",
            Box::new(TestConnectionHandler {
                usecase: test_connection_usecase,
            }),
        );

        Self {
            handlers,
            relay_file_usecase,
        }
    }

    /// Registered event names, sorted
    pub fn event_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub async fn route_text(&self, connection: &Arc<Connection>, text: &str) -> RouteOutcome {
        if let Err(e) = check_frame_len(text.len()) {
            tracing::warn!("Dropping text frame from {}: {}", connection.id(), e);
            return RouteOutcome::Oversized;
        }

        let envelope = match serde_json::from_str::<ClientEnvelope>(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("JSON unmarshal error from {}: {}", connection.id(), e);
                tracing::debug!("Raw data that failed to unmarshal: {}", text);
                return RouteOutcome::Malformed;
            }
        };

        let Some((&event, handler)) = self.handlers.get_key_value(envelope.event.as_str()) else {
            tracing::warn!("No handler for event: {}", envelope.event);
            return RouteOutcome::UnknownEvent(envelope.event);
        };

        tracing::debug!("Received event '{}' from {}", event, connection.id());
        match handler.handle(connection, envelope.data).await {
            Ok(()) => RouteOutcome::Handled(event),
            Err(HandlerError::Join(JoinRoomError::RoomFull {
                room,
                current_users,
            })) => {
                tracing::info!(
                    "Connection {} rejected from full room {} ({} users)",
                    connection.id(),
                    room,
                    current_users
                );
                RouteOutcome::Failed(event)
            }
            Err(HandlerError::Join(JoinRoomError::ConnectionClosed)) => {
                tracing::debug!(
                    "Dropping '{}' from closed connection {}",
                    event,
                    connection.id()
                );
                RouteOutcome::Failed(event)
            }
            Err(HandlerError::Relay(RelayError::NotInRoom)) => {
                tracing::debug!(
                    "Dropping '{}' from {}: not in a room",
                    event,
                    connection.id()
                );
                RouteOutcome::Failed(event)
            }
            Err(e) => {
                tracing::warn!("Invalid '{}' from {}: {}", event, connection.id(), e);
                RouteOutcome::Failed(event)
            }
        }
    }

    pub async fn route_binary(&self, connection: &Arc<Connection>, frame: Bytes) -> RouteOutcome {
        if let Err(e) = check_frame_len(frame.len()) {
            tracing::warn!(
                "Binary message too large from {}, dropping: {}",
                connection.id(),
                e
            );
            return RouteOutcome::Oversized;
        }
        if connection.room().is_none() {
            tracing::debug!(
                "Dropping binary frame from {}: not in a room",
                connection.id()
            );
            return RouteOutcome::Dropped;
        }

        tracing::debug!("Received binary message: {} bytes", frame.len());
        match self.relay_file_usecase.relay_binary(connection, frame).await {
            Ok(sent) => RouteOutcome::Relayed(sent),
            Err(e) => {
                tracing::warn!("Dropping binary frame from {}: {}", connection.id(), e);
                RouteOutcome::Dropped
            }
        }
    }
}
