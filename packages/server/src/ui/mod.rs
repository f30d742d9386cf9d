//! WebSocket relay server implementation.

mod error;
mod handler;
pub mod router;
mod server;
mod signal;
pub mod state;

pub use error::ServerError;
pub use handler::TRANSPORT_MAX_MESSAGE_LEN;
pub use router::{EventRouter, RouteOutcome};
pub use server::Server;
