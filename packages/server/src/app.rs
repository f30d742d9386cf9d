//! Composition root: wires the registry, broadcast engine and use cases.

use std::sync::Arc;

use crate::{
    infrastructure::{message_pusher::PipelineMessagePusher, repository::InMemoryRoomRepository},
    ui::{EventRouter, Server},
    usecase::{JoinRoomUseCase, LeaveRoomUseCase, RelayFileUseCase, TestConnectionUseCase},
};

/// Build a ready-to-run [`Server`] backed by the in-memory registry.
pub fn build_server() -> Server {
    // 1. Repository
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. MessagePusher
    let message_pusher = Arc::new(PipelineMessagePusher::new(repository.clone()));

    // 3. UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        repository.clone(),
        message_pusher.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(repository, message_pusher.clone()));
    let relay_file_usecase = Arc::new(RelayFileUseCase::new(message_pusher.clone()));
    let test_connection_usecase = Arc::new(TestConnectionUseCase::new(message_pusher));

    // 4. Event Router
    let event_router = Arc::new(EventRouter::new(
        join_room_usecase,
        leave_room_usecase.clone(),
        relay_file_usecase,
        test_connection_usecase,
    ));

    // 5. Server
    Server::new(event_router, leave_room_usecase)
}
