//! Per-conversation read cursors.
//!
//! A cursor is the number of leading messages considered read. Unread counts
//! are never stored; [`unread_count`] derives them from the sequence and the
//! cursor every time they are asked for.

use std::collections::HashMap;

use peerchat_shared::types::ConversationKey;

use crate::models::Message;

#[derive(Debug, Clone, Default)]
pub struct ReadPositions {
    cursors: HashMap<ConversationKey, usize>,
}

impl ReadPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor for `key`; conversations never marked read start at 0.
    pub fn cursor(&self, key: &str) -> usize {
        self.cursors.get(key).copied().unwrap_or(0)
    }

    /// Mark the first `len` messages of `key` as read.
    pub fn mark_read(&mut self, key: &str, len: usize) {
        self.cursors.insert(ConversationKey::from(key), len);
    }

    /// Reset the cursor to 0, keeping the entry.
    pub fn reset(&mut self, key: &str) {
        if let Some(cursor) = self.cursors.get_mut(key) {
            *cursor = 0;
        }
    }

    /// Drop the cursor for `key` entirely.
    pub fn forget(&mut self, key: &str) {
        self.cursors.remove(key);
    }

    pub fn clear(&mut self) {
        self.cursors.clear();
    }
}

/// Messages at index >= `cursor` whose sender is not `local`.
pub fn unread_count(messages: &[Message], cursor: usize, local: &str) -> usize {
    messages
        .iter()
        .skip(cursor)
        .filter(|m| m.sender != local)
        .count()
}
