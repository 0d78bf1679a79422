//! Server error types.

use thiserror::Error;

/// Errors that end [`Server::run`](super::Server::run).
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening address could not be bound; fatal at startup
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
