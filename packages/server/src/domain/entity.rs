//! Entities of the relay domain.

use super::value_object::{ClientId, ConnectionId, RemoteAddress, Timestamp};

/// Identity record of one registered connection.
///
/// Created on registration, dropped on deregistration; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub id: ClientId,
    pub remote_address: RemoteAddress,
    pub connected_at: Timestamp,
}

impl ClientInfo {
    pub fn new(id: ClientId, remote_address: RemoteAddress, connected_at: Timestamp) -> Self {
        Self {
            id,
            remote_address,
            connected_at,
        }
    }
}

/// A registered connection together with its identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection: ConnectionId,
    pub info: ClientInfo,
}
