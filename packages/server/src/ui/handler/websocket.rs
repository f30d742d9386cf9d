//! WebSocket connection handlers.
//!
//! Every connection runs two tasks: the reader routes inbound frames through
//! the [`EventRouter`](crate::ui::EventRouter), and the delivery loop drains
//! the connection's outbound queue into the socket. When either ends, the
//! connection is closed and removed from its room.
//!
//! Inbound size limits are two-tiered. Messages up to
//! [`TRANSPORT_MAX_MESSAGE_LEN`] reach the router, which drops anything over
//! the 2 MiB application cap and keeps the connection open. Larger messages
//! are rejected by the WebSocket layer itself and end the connection.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};

use crate::{
    domain::{CloseReason, Connection, Outbound, OutboundQueue},
    ui::state::AppState,
};

/// Largest inbound message (and frame) the WebSocket layer accepts
pub const TRANSPORT_MAX_MESSAGE_LEN: usize = 16 << 20;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(TRANSPORT_MAX_MESSAGE_LEN)
        .max_frame_size(TRANSPORT_MAX_MESSAGE_LEN)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

fn to_message(outbound: Outbound) -> Option<Message> {
    match outbound {
        Outbound::Event(event) => match serde_json::to_string(event.as_ref()) {
            Ok(json) => Some(Message::Text(json.into())),
            Err(e) => {
                tracing::error!("Failed to serialize '{}': {}", event.name(), e);
                None
            }
        },
        Outbound::Binary(frame) => Some(Message::Binary(frame)),
    }
}

/// Spawns the delivery loop: drains the outbound queue into the WebSocket sink.
///
/// The loop is the only writer to the socket, so frames leave in enqueue
/// order. It stops as soon as the connection is closed, even with frames
/// still queued, and marks the connection `Closed` on the way out.
fn pusher_loop(
    connection: Arc<Connection>,
    mut queue: OutboundQueue,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let outbound = tokio::select! {
                biased;
                _ = connection.closed() => break,
                next = queue.recv() => match next {
                    Some(outbound) => outbound,
                    None => break,
                },
            };
            let Some(message) = to_message(outbound) else {
                continue;
            };

            tokio::select! {
                biased;
                _ = connection.closed() => break,
                result = sender.send(message) => {
                    if let Err(e) = result {
                        tracing::warn!("Write error on connection {}: {}", connection.id(), e);
                        connection.close(CloseReason::WriteError);
                        break;
                    }
                }
            }
        }
        connection.mark_closed();
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (connection, queue) = Connection::open();
    tracing::info!("WebSocket connection established: {}", connection.id());

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(connection.clone(), queue, sender);

    let router = state.event_router.clone();
    let reader = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket read error on {}: {}", reader.id(), e);
                    return CloseReason::ReadError;
                }
            };

            match msg {
                Message::Text(text) => {
                    router.route_text(&reader, text.as_str()).await;
                }
                Message::Binary(frame) => {
                    router.route_binary(&reader, frame).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", reader.id());
                    return CloseReason::PeerClosed;
                }
                _ => {}
            }
        }
        CloseReason::PeerClosed
    });

    // If any one of the tasks completes, stop the other
    tokio::select! {
        reason = &mut recv_task => {
            connection.close(reason.unwrap_or(CloseReason::ReadError));
            // 配信ループは close を検知して終了する
            if let Err(e) = send_task.await {
                tracing::warn!(
                    "Delivery loop for {} ended abnormally: {}",
                    connection.id(),
                    e
                );
            }
        }
        _ = &mut send_task => {
            recv_task.abort();
            // 処理中のイベント（join-room など）が終わってから退出させる
            if let Err(e) = recv_task.await
                && !e.is_cancelled()
            {
                tracing::warn!("Reader for {} ended abnormally: {}", connection.id(), e);
            }
        }
    };

    connection.close(CloseReason::PeerClosed);
    let outcome = state.leave_room_usecase.disconnect(&connection).await;
    connection.mark_closed();

    match outcome.room() {
        Some(room) => tracing::info!(
            "Connection {} closed ({:?}) and left room {}",
            connection.id(),
            connection.close_reason(),
            room
        ),
        None => tracing::info!(
            "Connection {} closed ({:?})",
            connection.id(),
            connection.close_reason()
        ),
    }
}
