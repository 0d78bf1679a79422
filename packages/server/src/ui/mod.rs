//! WebSocket relay server implementation.

mod error;
mod handler;
mod server;
mod signal;
pub mod state;

pub use error::ServerError;
pub use server::{Server, ServerConfig};
pub use signal::shutdown_signal;
