//! WebSocket relay server.
//!
//! Assigns every connected peer a numeric id and forwards each inbound message to all
//! other peers inside a JSON envelope.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hatake-server
//! cargo run --bin hatake-server -- 9000
//! cargo run --bin hatake-server -- 9000 --host 127.0.0.1 --outbound-buffer 64
//! ```

use std::{num::NonZeroUsize, sync::Arc};

use clap::Parser;
use hatake_server::{bootstrap::build_server, ui::ServerConfig};
use hatake_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hatake-server")]
#[command(about = "WebSocket relay server for sensors and dashboards", long_about = None)]
struct Args {
    /// Port number to listen on
    #[arg(default_value_t = 8080)]
    port: u16,

    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Capacity of each connection's outbound queue; a peer that falls this far behind is disconnected
    #[arg(short = 'b', long, default_value = "256")]
    outbound_buffer: NonZeroUsize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            outbound_buffer: args.outbound_buffer.get(),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::from(Args::parse());

    let server = build_server(&config, Arc::new(SystemClock));
    if let Err(e) = server.run(&config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
