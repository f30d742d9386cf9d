//! Filedrop relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin filedrop-server
//! cargo run --bin filedrop-server -- --host 127.0.0.1 --port 3000
//! FILEDROP_LOG_LEVEL=debug cargo run --bin filedrop-server
//! ```

use clap::Parser;
use filedrop_server::{app::build_server, config::ServerConfig};
use filedrop_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    let server = build_server();
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
