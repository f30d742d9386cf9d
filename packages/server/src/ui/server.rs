//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::LeaveRoomUseCase;

use super::{
    error::ServerError,
    handler::{health_check, websocket_handler},
    router::EventRouter,
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(event_router, leave_room_usecase);
/// server.run("0.0.0.0".to_string(), 6969).await?;
/// ```
pub struct Server {
    /// EventRouter（受信イベントのディスパッチ）
    event_router: Arc<EventRouter>,
    /// LeaveRoomUseCase（切断時の退出のユースケース）
    leave_room_usecase: Arc<LeaveRoomUseCase>,
}

impl Server {
    pub fn new(event_router: Arc<EventRouter>, leave_room_usecase: Arc<LeaveRoomUseCase>) -> Self {
        Self {
            event_router,
            leave_room_usecase,
        }
    }

    /// Build the axum router with all endpoints
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            event_router: self.event_router,
            leave_room_usecase: self.leave_room_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind `host:port` and serve until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Filedrop relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!("Registered events: {:?}", self.event_router.event_names());
        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
