//! Ephemeral typing indicators.
//!
//! Each conversation maps to the usernames currently composing and the
//! instant of their last keystroke. Entries expire after the inactivity
//! window; a conversation with nobody typing is removed, never kept with an
//! empty set.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use peerchat_shared::constants::TYPING_WINDOW_MS;
use peerchat_shared::types::ConversationKey;

#[derive(Debug, Clone)]
pub struct TypingRegistry {
    entries: HashMap<ConversationKey, HashMap<String, Instant>>,
    window: Duration,
}

impl TypingRegistry {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record input from `username` in `key` at `now`, restarting their window.
    pub fn touch(&mut self, key: &str, username: &str, now: Instant) {
        self.entries
            .entry(ConversationKey::from(key))
            .or_default()
            .insert(username.to_string(), now);
    }

    /// Remove `username` from `key` immediately. Returns whether they were typing.
    pub fn stop(&mut self, key: &str, username: &str) -> bool {
        let Some(users) = self.entries.get_mut(key) else {
            return false;
        };
        let removed = users.remove(username).is_some();
        if users.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    /// Drop expired entries. Returns the keys whose typing set changed.
    pub fn prune(&mut self, now: Instant) -> Vec<ConversationKey> {
        let window = self.window;
        let mut changed = Vec::new();

        self.entries.retain(|key, users| {
            let before = users.len();
            users.retain(|_, last| now.saturating_duration_since(*last) < window);
            if users.len() != before {
                debug!(key = %key, expired = before - users.len(), "Typing indicators expired");
                changed.push(key.clone());
            }
            !users.is_empty()
        });

        changed.sort();
        changed
    }

    /// Usernames typing in `key` at `now`, sorted. Ignores expired entries.
    pub fn typing(&self, key: &str, now: Instant) -> Vec<String> {
        let mut users: Vec<String> = self
            .entries
            .get(key)
            .map(|users| {
                users
                    .iter()
                    .filter(|(_, last)| now.saturating_duration_since(**last) < self.window)
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default();
        users.sort();
        users
    }

    /// Whether any conversation currently has an entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_entry(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn forget(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for TypingRegistry {
    fn default() -> Self {
        Self::new(Duration::from_millis(TYPING_WINDOW_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_expires_after_window() {
        let mut registry = TypingRegistry::default();
        let t0 = Instant::now();
        registry.touch("general", "bob", t0);
        assert_eq!(registry.typing("general", t0 + Duration::from_secs(1)), ["bob"]);

        let later = t0 + Duration::from_millis(3_100);
        assert!(registry.typing("general", later).is_empty());

        let changed = registry.prune(later);
        assert_eq!(changed, [ConversationKey::from("general")]);
        assert!(!registry.has_entry("general"));
    }

    #[test]
    fn test_touch_restarts_window() {
        let mut registry = TypingRegistry::default();
        let t0 = Instant::now();
        registry.touch("general", "bob", t0);
        registry.touch("general", "bob", t0 + Duration::from_secs(2));

        let t4 = t0 + Duration::from_secs(4);
        assert!(registry.prune(t4).is_empty());
        assert_eq!(registry.typing("general", t4), ["bob"]);
    }

    #[test]
    fn test_stop_prunes_empty_set() {
        let mut registry = TypingRegistry::default();
        let now = Instant::now();
        registry.touch("bob", "bob", now);
        registry.touch("general", "carol", now);
        registry.touch("general", "dave", now);

        assert!(registry.stop("bob", "bob"));
        assert!(!registry.has_entry("bob"));

        assert!(registry.stop("general", "carol"));
        assert!(registry.has_entry("general"));
        assert!(!registry.stop("general", "carol"));
    }

    #[test]
    fn test_prune_keeps_fresh_users() {
        let mut registry = TypingRegistry::new(Duration::from_secs(3));
        let t0 = Instant::now();
        registry.touch("general", "carol", t0);
        registry.touch("general", "dave", t0 + Duration::from_secs(2));

        let changed = registry.prune(t0 + Duration::from_secs(4));
        assert_eq!(changed.len(), 1);
        assert_eq!(registry.typing("general", t0 + Duration::from_secs(4)), ["dave"]);
    }
}
