//! Domain error types.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Failure to hand a message to one connection's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// The connection has no attached outbound queue
    #[error("connection {0} is not attached")]
    ClientNotFound(ConnectionId),

    /// The connection's socket task has already gone away
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    /// The connection's outbound queue is full; the connection is dropped
    #[error("outbound queue of connection {0} is full")]
    QueueFull(ConnectionId),
}
