//! Data Transfer Objects (DTOs) for the relay.
//!
//! - `websocket`: inbound WebSocket envelope and event payloads

pub mod websocket;
