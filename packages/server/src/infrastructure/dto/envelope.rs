//! WebSocket envelope DTOs.
//!
//! Every frame the relay emits is one [`Envelope`], discriminated by its `type` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ClientId, ClientInfo, Timestamp};

/// Wire envelope exchanged with peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    System(SystemMessage),
    Forward(ForwardMessage),
    Text(TextMessage),
}

/// `action` of a `system` envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemAction {
    Connected,
    ClientJoined,
    ClientLeft,
    MessageSent,
    ServerShutdown,
}

/// Server notification. Optional fields are omitted from the wire when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMessage {
    pub action: SystemAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_count: Option<usize>,
    pub timestamp: String,
}

/// Inbound payload relayed to the other peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardMessage {
    pub from: u64,
    pub from_ip: String,
    pub data: Value,
    pub timestamp: String,
}

/// Wrapper for inbound data that is not valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub content: String,
}

impl Envelope {
    /// Private welcome for a freshly registered connection
    pub fn connected(client_id: ClientId, online_count: usize, timestamp: Timestamp) -> Self {
        Self::System(SystemMessage {
            action: SystemAction::Connected,
            client_id: Some(client_id.value()),
            message: Some(format!("connected, clientId: {}", client_id.value())),
            online_count: Some(online_count),
            recipient_count: None,
            timestamp: timestamp.to_iso8601(),
        })
    }

    pub fn client_joined(client_id: ClientId, online_count: usize, timestamp: Timestamp) -> Self {
        Self::System(SystemMessage {
            action: SystemAction::ClientJoined,
            client_id: Some(client_id.value()),
            message: None,
            online_count: Some(online_count),
            recipient_count: None,
            timestamp: timestamp.to_iso8601(),
        })
    }

    pub fn client_left(client_id: ClientId, online_count: usize, timestamp: Timestamp) -> Self {
        Self::System(SystemMessage {
            action: SystemAction::ClientLeft,
            client_id: Some(client_id.value()),
            message: None,
            online_count: Some(online_count),
            recipient_count: None,
            timestamp: timestamp.to_iso8601(),
        })
    }

    /// Advisory acknowledgement sent back to the author of a relayed message
    pub fn message_sent(recipient_count: usize, timestamp: Timestamp) -> Self {
        Self::System(SystemMessage {
            action: SystemAction::MessageSent,
            client_id: None,
            message: Some("message_sent".to_string()),
            online_count: None,
            recipient_count: Some(recipient_count),
            timestamp: timestamp.to_iso8601(),
        })
    }

    pub fn server_shutdown(timestamp: Timestamp) -> Self {
        Self::System(SystemMessage {
            action: SystemAction::ServerShutdown,
            client_id: None,
            message: Some("server_shutdown".to_string()),
            online_count: None,
            recipient_count: None,
            timestamp: timestamp.to_iso8601(),
        })
    }

    pub fn forward(from: &ClientInfo, data: Value, timestamp: Timestamp) -> Self {
        Self::Forward(ForwardMessage {
            from: from.id.value(),
            from_ip: from.remote_address.as_str().to_string(),
            data,
            timestamp: timestamp.to_iso8601(),
        })
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextMessage {
            content: content.into(),
        })
    }
}
