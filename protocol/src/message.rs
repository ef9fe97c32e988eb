//! Chat wire types exchanged with the backend over the live channel.

use serde::{Deserialize, Serialize};

/// Kind of a chat frame.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    /// Ordinary user text.
    Text,
    /// Backend-originated announcement (joins, leaves, notices).
    System,
    /// Backend-side failure report.
    Error,
    /// Keep-alive frame.
    Heartbeat,
}

/// Message delivered by the backend.
///
/// Identifiers and timestamps are assigned by the backend; the client
/// never fabricates them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: String,
    pub from_ip: String,
    pub from_session_id: String,
    /// Present only for direct (point-to-point) messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ip: Option<String>,
    pub message_type: MessageType,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ChatMessage {
    /// True when the message is addressed to a single peer.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.target_ip.is_some()
    }
}

/// Frame sent by the client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFrame {
    pub message_type: MessageType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ip: Option<String>,
}

impl OutboundFrame {
    /// Builds a text frame, optionally addressed to a single peer.
    #[must_use]
    pub fn text(content: impl Into<String>, target_ip: Option<String>) -> Self {
        Self {
            message_type: MessageType::Text,
            content: content.into(),
            target_ip,
        }
    }
}
