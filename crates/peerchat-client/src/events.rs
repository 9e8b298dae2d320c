//! Events published to whatever renders the session.

use serde::Serialize;
use tokio::sync::broadcast;

use peerchat_shared::types::ConversationKey;
use peerchat_store::Message;

use crate::sync::SyncState;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// A message landed in a conversation, from a send or a poll.
    #[serde(rename_all = "camelCase")]
    MessageAppended {
        key: ConversationKey,
        message: Message,
    },

    /// The typing set of a conversation changed.
    #[serde(rename_all = "camelCase")]
    TypingChanged {
        key: ConversationKey,
        users: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    SyncStateChanged { state: SyncState },

    #[serde(rename_all = "camelCase")]
    RosterUpdated {
        peer_count: usize,
        channels: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    ConversationRemoved { key: ConversationKey },
}

/// Fan-out of [`ClientEvent`]s. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscriber is fine.
    pub fn emit(&self, event: ClientEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        bus.emit(ClientEvent::ConversationRemoved {
            key: ConversationKey::from("general"),
        });
    }

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        bus.emit(ClientEvent::SyncStateChanged {
            state: SyncState::Active,
        });

        match rx.recv().await.unwrap() {
            ClientEvent::SyncStateChanged { state } => assert_eq!(state, SyncState::Active),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ClientEvent::TypingChanged {
            key: ConversationKey::from("bob"),
            users: vec!["bob".into()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "typingChanged");
        assert_eq!(json["key"], "bob");
    }
}
