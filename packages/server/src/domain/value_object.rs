//! Value objects of the relay domain.

use std::{
    fmt,
    net::SocketAddr,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use hatake_shared::time::to_iso8601;

/// Protocol-visible identity of a peer.
///
/// Positive, allocated from the registry's monotonic counter and never reused
/// within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl ClientId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transport-side handle of one connection.
///
/// Opaque to the protocol; the registry only uses it as a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Allocates [`ConnectionId`]s for accepted sockets.
#[derive(Debug)]
pub struct ConnectionIdFactory {
    next: AtomicU64,
}

impl ConnectionIdFactory {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn generate(&self) -> ConnectionId {
        ConnectionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionIdFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort textual address of a peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteAddress(String);

impl RemoteAddress {
    const UNKNOWN: &'static str = "unknown";

    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::unknown()
        } else {
            Self(value)
        }
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Peer IP as text, or `"unknown"` when the transport exposes no address.
    pub fn from_socket_addr(addr: Option<SocketAddr>) -> Self {
        match addr {
            Some(addr) => Self(addr.ip().to_string()),
            None => Self::unknown(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// UTC instant used for `connectedAt` and envelope timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }

    /// ISO-8601 UTC text, e.g. `2023-01-01T00:00:00.000Z`.
    pub fn to_iso8601(&self) -> String {
        to_iso8601(&self.0)
    }
}
