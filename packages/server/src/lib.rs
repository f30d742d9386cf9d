//! Filedrop relay server library.
//!
//! Clients join named rooms of up to five members over WebSocket and relay
//! file metadata, chunks and progress to each other through the server.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod app;
pub mod config;
