//! Infrastructure layer: concrete registry, broadcast engine and wire DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
