//! Known peers and joined channels.
//!
//! The peer list is replaced wholesale on every directory refresh. Channel
//! membership is tracked per joined channel.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use peerchat_shared::types::{ConversationKind, Peer};

#[derive(Debug, Clone, Default)]
pub struct Roster {
    peers: Vec<Peer>,
    channels: BTreeMap<String, BTreeSet<String>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the peer list with a fresh directory snapshot.
    pub fn replace_peers(&mut self, peers: Vec<Peer>) {
        debug!(count = peers.len(), "Roster peers replaced");
        self.peers = peers;
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn peer(&self, username: &str) -> Option<&Peer> {
        self.peers.iter().find(|p| p.username == username)
    }

    /// Record a joined channel and its current members.
    pub fn join_channel(&mut self, channel: &str, members: impl IntoIterator<Item = String>) {
        self.channels
            .entry(channel.to_string())
            .or_default()
            .extend(members);
    }

    /// Replace the member list of a channel already joined.
    pub fn set_members(&mut self, channel: &str, members: impl IntoIterator<Item = String>) {
        if let Some(existing) = self.channels.get_mut(channel) {
            *existing = members.into_iter().collect();
        }
    }

    /// Forget a channel. Returns whether it was joined.
    pub fn leave_channel(&mut self, channel: &str) -> bool {
        self.channels.remove(channel).is_some()
    }

    pub fn is_channel(&self, key: &str) -> bool {
        self.channels.contains_key(key)
    }

    /// Joined channels, sorted.
    pub fn channels(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    pub fn members(&self, channel: &str) -> Vec<String> {
        self.channels
            .get(channel)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Joined channels win over peers sharing the same name.
    pub fn kind_of(&self, key: &str) -> ConversationKind {
        if self.is_channel(key) {
            ConversationKind::Channel
        } else {
            ConversationKind::Direct
        }
    }

    pub fn clear(&mut self) {
        self.peers.clear();
        self.channels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(name: &str, port: u16) -> Peer {
        Peer {
            username: name.into(),
            ip: "127.0.0.1".into(),
            port,
            channels: Vec::new(),
        }
    }

    #[test]
    fn test_replace_peers_is_not_a_merge() {
        let mut roster = Roster::new();
        roster.replace_peers(vec![peer("bob", 9001), peer("carol", 9002)]);
        roster.replace_peers(vec![peer("dave", 9003)]);

        assert_eq!(roster.peers().len(), 1);
        assert!(roster.peer("bob").is_none());
        assert_eq!(roster.peer("dave").map(|p| p.port), Some(9003));
    }

    #[test]
    fn test_join_and_leave_channel() {
        let mut roster = Roster::new();
        roster.join_channel("general", vec!["alice".into(), "carol".into()]);

        assert!(roster.is_channel("general"));
        assert_eq!(roster.kind_of("general"), ConversationKind::Channel);
        assert_eq!(roster.kind_of("bob"), ConversationKind::Direct);
        assert_eq!(roster.members("general"), ["alice", "carol"]);

        roster.set_members("general", vec!["alice".into()]);
        assert_eq!(roster.members("general"), ["alice"]);

        assert!(roster.leave_channel("general"));
        assert!(!roster.leave_channel("general"));
        assert!(roster.channels().is_empty());
    }
}
