use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name under which messages are grouped: a channel name or a peer username.
///
/// Channels and peers share one namespace; the roster decides which one a
/// key refers to at use time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ConversationKey(pub String);

impl ConversationKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ConversationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConversationKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConversationKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether a conversation key names a channel or a direct peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Channel,
}

impl ConversationKind {
    /// Title shown for a conversation of this kind (`#general` or `bob`).
    pub fn title(&self, key: &str) -> String {
        match self {
            Self::Channel => format!("#{key}"),
            Self::Direct => key.to_string(),
        }
    }
}

/// A roster entry as returned by the directory service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Peer {
    pub username: String,
    pub ip: String,
    pub port: u16,
    #[serde(default)]
    pub channels: Vec<String>,
}

impl Peer {
    /// `ip:port` network address of the peer.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}
