//! JSON records exchanged with the directory and peer-messaging services.
//!
//! Inbound records arrive with loose typing (every field optional). They are
//! classified exactly once, at the edge, into the [`Inbound`] variant so the
//! rest of the client never re-checks optional fields.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DIRECT_CHANNEL, STATUS_SUCCESS};
use crate::error::ProtocolError;
use crate::types::{ConversationKey, ConversationKind, Peer};

/// Emoji → usernames who reacted with it.
pub type Reactions = BTreeMap<String, BTreeSet<String>>;

/// Current instant in the ISO-8601 form the services use for `time`.
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// Pending messages
// ---------------------------------------------------------------------------

/// Body of `POST /get-messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingMessagesRequest {
    pub username: String,
    /// Always `null`: the client pulls every conversation at once.
    pub channel: Option<String>,
}

impl PendingMessagesRequest {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            channel: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMessagesResponse {
    pub status: String,
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PendingMessagesResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Decode each record on its own so one bad entry does not sink the batch.
    pub fn records(&self) -> Vec<Result<InboundRecord, ProtocolError>> {
        self.messages
            .iter()
            .map(|value| {
                serde_json::from_value::<InboundRecord>(value.clone())
                    .map_err(|e| ProtocolError::Serialization(e.to_string()))
            })
            .collect()
    }
}

/// One pending record as the messaging service reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundRecord {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub reactions: Option<Reactions>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMessage {
    pub sender: String,
    pub body: String,
    pub time: String,
    pub reactions: Reactions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub channel: String,
    pub sender: String,
    pub body: String,
    pub time: String,
    pub reactions: Reactions,
}

/// A classified inbound record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Direct(DirectMessage),
    Channel(ChannelMessage),
}

impl InboundRecord {
    /// Resolve the record into a direct or channel message.
    ///
    /// An absent, empty or `"direct"` channel tag is a direct designation.
    pub fn classify(self) -> Result<Inbound, ProtocolError> {
        let sender = non_empty(self.from).ok_or(ProtocolError::MissingField("from"))?;
        let body = self.message.ok_or(ProtocolError::MissingField("message"))?;
        let time = non_empty(self.time).ok_or(ProtocolError::MissingField("time"))?;
        let reactions = self.reactions.unwrap_or_default();

        match non_empty(self.channel) {
            Some(channel) if channel != DIRECT_CHANNEL => Ok(Inbound::Channel(ChannelMessage {
                channel,
                sender,
                body,
                time,
                reactions,
            })),
            _ => Ok(Inbound::Direct(DirectMessage {
                sender,
                body,
                time,
                reactions,
            })),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl Inbound {
    pub fn sender(&self) -> &str {
        match self {
            Self::Direct(m) => &m.sender,
            Self::Channel(m) => &m.sender,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Direct(m) => &m.body,
            Self::Channel(m) => &m.body,
        }
    }

    pub fn time(&self) -> &str {
        match self {
            Self::Direct(m) => &m.time,
            Self::Channel(m) => &m.time,
        }
    }

    pub fn kind(&self) -> ConversationKind {
        match self {
            Self::Direct(_) => ConversationKind::Direct,
            Self::Channel(_) => ConversationKind::Channel,
        }
    }

    /// Channel tag to store on the message, if any.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::Channel(m) => Some(&m.channel),
        }
    }

    pub fn reactions(&self) -> &Reactions {
        match self {
            Self::Direct(m) => &m.reactions,
            Self::Channel(m) => &m.reactions,
        }
    }

    /// Conversation the record is filed under, seen from `local`.
    ///
    /// Returns `None` for direct records the local identity sent itself:
    /// those were appended when they were sent.
    pub fn target_key(&self, local: &str) -> Option<ConversationKey> {
        match self {
            Self::Direct(m) if m.sender == local => None,
            Self::Direct(m) => Some(ConversationKey::new(m.sender.clone())),
            Self::Channel(m) => Some(ConversationKey::new(m.channel.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Peer-messaging requests
// ---------------------------------------------------------------------------

/// Generic `{status, message?, sent_count?}` reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sent_count: Option<u32>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Turn a non-success status into [`ProtocolError::Rejected`].
    pub fn into_result(self) -> Result<Self, ProtocolError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProtocolError::Rejected {
                message: self.message.clone().unwrap_or_default(),
                status: self.status,
            })
        }
    }
}

/// Body of `POST /send-peer`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendPeerRequest {
    pub username: String,
    pub peer_username: String,
    pub message: String,
    pub channel: String,
}

/// Body of `POST /broadcast-peer`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BroadcastRequest {
    pub username: String,
    pub message: String,
    pub channel: String,
}

/// Body of `POST /init-peer`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitPeerRequest {
    pub username: String,
    pub peer_ip: String,
    pub peer_port: u16,
    pub tracker_ip: String,
    pub tracker_port: u16,
}

/// Body of `POST /connect-peer`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectPeerRequest {
    pub username: String,
    pub peer_username: String,
    pub peer_ip: String,
    pub peer_port: u16,
}

/// Body of `POST /join-channel` (messaging) and of `/add-list` and
/// `/remove-list` (directory).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelMembershipRequest {
    pub username: String,
    pub channel: String,
}

// ---------------------------------------------------------------------------
// Directory requests
// ---------------------------------------------------------------------------

/// Body of `POST /register` and `POST /login`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /submit-info`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitInfoRequest {
    pub username: String,
    pub ip: String,
    pub port: u16,
    pub channels: Vec<String>,
}

/// Reply to `/add-list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl MembershipResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Body of `POST /get-list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetListResponse {
    pub status: String,
    #[serde(default)]
    pub peers: Vec<Peer>,
    #[serde(default)]
    pub channels: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GetListResponse {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}
