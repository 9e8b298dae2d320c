//! Domain model structs held by the in-memory stores.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the UI layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use peerchat_shared::protocol::{iso_now, Inbound, Reactions};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.
///
/// Two messages with the same sender, body and timestamp are the same
/// message, whichever poll delivered them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Local handle for UI keys and reaction toggles. Not part of identity.
    pub id: Uuid,
    /// Username of the author.
    pub sender: String,
    /// Message text.
    pub body: String,
    /// ISO-8601 instant as reported by the sender. Display only.
    pub timestamp: String,
    /// Channel tag, `None` for direct messages.
    pub channel: Option<String>,
    /// Whether the local identity authored this message.
    pub sent: bool,
    /// Emoji → usernames.
    pub reactions: Reactions,
}

impl Message {
    /// Compose a locally authored message stamped with the current instant.
    pub fn outgoing(sender: &str, body: &str, channel: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: sender.to_string(),
            body: body.to_string(),
            timestamp: iso_now(),
            channel: channel.map(str::to_string),
            sent: true,
            reactions: Reactions::new(),
        }
    }

    /// Build a stored message from a classified inbound record.
    pub fn from_inbound(inbound: &Inbound, local: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: inbound.sender().to_string(),
            body: inbound.body().to_string(),
            timestamp: inbound.time().to_string(),
            channel: inbound.channel().map(str::to_string),
            sent: inbound.sender() == local,
            reactions: inbound.reactions().clone(),
        }
    }

    /// Deduplication identity: `(sender, body, timestamp)`.
    pub fn matches(&self, sender: &str, body: &str, timestamp: &str) -> bool {
        self.sender == sender && self.body == body && self.timestamp == timestamp
    }
}
