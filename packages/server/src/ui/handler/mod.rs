pub mod event;
mod http;
mod websocket;

pub use http::health_check;
pub use websocket::{TRANSPORT_MAX_MESSAGE_LEN, websocket_handler};
