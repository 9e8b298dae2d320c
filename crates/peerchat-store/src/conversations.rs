//! The conversation store: conversation key → ordered message sequence.
//!
//! Sequences keep arrival order; timestamps are never used to re-sort. The
//! store also owns the read cursors so that clearing or removing a
//! conversation cannot leave a stale cursor behind.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use uuid::Uuid;

use peerchat_shared::types::ConversationKey;

use crate::models::Message;
use crate::read_positions::{self, ReadPositions};

#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: HashMap<ConversationKey, Vec<Message>>,
    read: ReadPositions,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty conversation for `key` if none exists yet.
    pub fn ensure(&mut self, key: &str) {
        if !self.conversations.contains_key(key) {
            self.conversations
                .insert(ConversationKey::from(key), Vec::new());
        }
    }

    /// Append `message` at the end of `key`'s sequence, creating it if absent.
    pub fn append(&mut self, key: &str, message: Message) {
        match self.conversations.get_mut(key) {
            Some(messages) => messages.push(message),
            None => {
                self.conversations
                    .insert(ConversationKey::from(key), vec![message]);
            }
        }
    }

    /// Append `message` unless the sequence already holds one with the same
    /// sender, body and timestamp. Returns whether it was appended.
    pub fn append_if_new(&mut self, key: &str, message: Message) -> bool {
        if self.contains(key, &message.sender, &message.body, &message.timestamp) {
            debug!(key = %key, sender = %message.sender, "Dropping duplicate message");
            return false;
        }
        self.append(key, message);
        true
    }

    pub fn contains(&self, key: &str, sender: &str, body: &str, timestamp: &str) -> bool {
        self.messages(key)
            .iter()
            .any(|m| m.matches(sender, body, timestamp))
    }

    /// Messages of `key` in arrival order (empty if the key is unknown).
    pub fn messages(&self, key: &str) -> &[Message] {
        self.conversations
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self, key: &str) -> usize {
        self.messages(key).len()
    }

    pub fn has(&self, key: &str) -> bool {
        self.conversations.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// All known conversation keys, sorted.
    pub fn keys(&self) -> Vec<ConversationKey> {
        let mut keys: Vec<_> = self.conversations.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Empty `key`'s sequence and reset its read cursor to 0.
    pub fn clear(&mut self, key: &str) {
        if let Some(messages) = self.conversations.get_mut(key) {
            messages.clear();
        }
        self.read.reset(key);
    }

    /// Delete `key`'s sequence and its read cursor. Returns whether the
    /// conversation existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.read.forget(key);
        self.conversations.remove(key).is_some()
    }

    /// Drop every conversation and cursor.
    pub fn clear_all(&mut self) {
        self.conversations.clear();
        self.read.clear();
    }

    /// Mark every message currently in `key` as read.
    pub fn mark_read(&mut self, key: &str) {
        let len = self.len(key);
        self.read.mark_read(key, len);
    }

    pub fn cursor(&self, key: &str) -> usize {
        self.read.cursor(key)
    }

    /// Unread messages in `key` not authored by `local`.
    pub fn unread_count(&self, key: &str, local: &str) -> usize {
        read_positions::unread_count(self.messages(key), self.read.cursor(key), local)
    }

    pub fn total_unread(&self, local: &str) -> usize {
        self.conversations
            .keys()
            .map(|key| self.unread_count(key.as_str(), local))
            .sum()
    }

    /// Per-conversation unread counts, omitting conversations with none.
    pub fn unread_summary(&self, local: &str) -> BTreeMap<ConversationKey, usize> {
        self.conversations
            .keys()
            .filter_map(|key| {
                let unread = self.unread_count(key.as_str(), local);
                (unread > 0).then(|| (key.clone(), unread))
            })
            .collect()
    }

    /// Add `username` to the `emoji` reaction of a message, or remove them if
    /// already present. Returns `false` if the message does not exist.
    pub fn toggle_reaction(
        &mut self,
        key: &str,
        message_id: Uuid,
        emoji: &str,
        username: &str,
    ) -> bool {
        let Some(message) = self
            .conversations
            .get_mut(key)
            .and_then(|messages| messages.iter_mut().find(|m| m.id == message_id))
        else {
            return false;
        };

        let users = message.reactions.entry(emoji.to_string()).or_default();
        if !users.remove(username) {
            users.insert(username.to_string());
        }
        if users.is_empty() {
            message.reactions.remove(emoji);
        }
        true
    }
}
